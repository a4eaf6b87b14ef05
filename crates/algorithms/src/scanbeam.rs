//! Sweep line structure answering point in polygon queries.
//!
//! A [`Scanbeam`] sorts the end points of every record of a store by y and tracks
//! which records cross the current scanline (the active edges) as the scanline moves
//! up and down through the events. Only events between the old and the new scanline
//! positions are applied, the active set is never rebuilt from scratch.
//!
//! Every record takes part through its chord (the line between its end points), with
//! half open extents: a chord is active at `y` if `y_min <= y < y_max`. Horizontal
//! chords are never active.

use crate::geom::LineSegment;
use crate::math::Point;
use crate::path::Geomstr;

use core::cmp::Ordering;

/// The start or the end of an edge in the sweep.
///
/// Begin events carry the index of the record, end events its one's complement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Event {
    pub position: Point,
    pub edge: isize,
}

impl Event {
    #[inline]
    pub fn is_begin(&self) -> bool {
        self.edge >= 0
    }

    /// Index of the record this event belongs to.
    #[inline]
    pub fn index(&self) -> usize {
        if self.is_begin() {
            self.edge as usize
        } else {
            !self.edge as usize
        }
    }
}

fn compare_events(a: &Event, b: &Event) -> Ordering {
    a.position
        .y
        .total_cmp(&b.position.y)
        .then(a.position.x.total_cmp(&b.position.x))
        // End events first.
        .then(a.is_begin().cmp(&b.is_begin()))
}

pub struct Scanbeam<'l, P = usize> {
    path: &'l Geomstr<P>,
    chords: Vec<Option<LineSegment>>,
    events: Vec<Event>,
    /// Number of applied events.
    cursor: usize,
    actives: Vec<usize>,
    dirty: bool,
    scanline: f64,
}

impl<'l, P: Copy> Scanbeam<'l, P> {
    /// Builds the sweep over a store, positioned on the lowest beam.
    ///
    /// The store is expected to stay the same for the lifetime of the scanbeam.
    pub fn new(path: &'l Geomstr<P>) -> Self {
        let chords: Vec<Option<LineSegment>> = path
            .iter()
            .map(|segment| match (segment.start(), segment.end()) {
                (Some(from), Some(to)) if from.y != to.y => Some(LineSegment { from, to }),
                _ => None,
            })
            .collect();

        let mut events = Vec::with_capacity(chords.len() * 2);
        for (index, chord) in chords.iter().enumerate() {
            let chord = match chord {
                Some(chord) => chord,
                None => continue,
            };
            let (low, high) = if chord.from.y < chord.to.y {
                (chord.from, chord.to)
            } else {
                (chord.to, chord.from)
            };
            events.push(Event {
                position: low,
                edge: index as isize,
            });
            events.push(Event {
                position: high,
                edge: !(index as isize),
            });
        }
        events.sort_by(compare_events);

        log::debug!("scanbeam over {} records: {} events", path.len(), events.len());

        let mut beam = Scanbeam {
            path,
            chords,
            events,
            cursor: 0,
            actives: Vec::new(),
            dirty: false,
            scanline: f64::NEG_INFINITY,
        };
        // Start in the lowest beam.
        if let Some(first) = beam.events.first() {
            let y = first.position.y;
            beam.scanline_to(y);
        }

        beam
    }

    /// The store this scanbeam was built from.
    pub fn path(&self) -> &'l Geomstr<P> {
        self.path
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Current scanline position.
    pub fn scanline(&self) -> f64 {
        self.scanline
    }

    /// Lower bound of the current beam: the y of the last applied event.
    pub fn low(&self) -> f64 {
        match self.cursor {
            0 => f64::NEG_INFINITY,
            cursor => self.events[cursor - 1].position.y,
        }
    }

    /// Upper bound of the current beam: the y of the next event to apply.
    pub fn high(&self) -> f64 {
        match self.events.get(self.cursor) {
            Some(event) => event.position.y,
            None => f64::INFINITY,
        }
    }

    /// Applies the next event. Returns false if there is none left.
    pub fn increment_scanbeam(&mut self) -> bool {
        let event = match self.events.get(self.cursor) {
            Some(event) => *event,
            None => return false,
        };
        self.cursor += 1;
        if event.is_begin() {
            self.actives.push(event.index());
        } else {
            self.deactivate(event.index());
        }
        self.dirty = true;

        true
    }

    /// Undoes the last applied event. Returns false if no event is applied.
    pub fn decrement_scanbeam(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let event = self.events[self.cursor];
        if event.is_begin() {
            self.deactivate(event.index());
        } else {
            self.actives.push(event.index());
        }
        self.dirty = true;

        true
    }

    fn deactivate(&mut self, index: usize) {
        if let Some(position) = self.actives.iter().position(|&active| active == index) {
            self.actives.swap_remove(position);
        }
    }

    /// Moves the scanline, applying or undoing the events in between.
    pub fn scanline_to(&mut self, y: f64) {
        while y >= self.high() && self.increment_scanbeam() {}
        while y < self.low() && self.decrement_scanbeam() {}
        self.scanline = y;
        self.dirty = true;
    }

    /// x coordinate at which the chord of the record at `index` crosses the scanline.
    ///
    /// Returns `None` for records that are not part of the sweep.
    pub fn x_intercept(&self, index: usize) -> Option<f64> {
        let chord = self.chords.get(index).copied().flatten()?;
        if chord.from.x == chord.to.x {
            return Some(chord.from.x);
        }
        let t = (self.scanline - chord.from.y) / (chord.to.y - chord.from.y);

        Some(chord.from.x + (chord.to.x - chord.from.x) * t)
    }

    /// Indices of the active edges sorted by their intercept with the scanline.
    pub fn actives(&mut self) -> &[usize] {
        if self.dirty {
            let mut keyed: Vec<(f64, usize)> = self
                .actives
                .iter()
                .map(|&index| (self.x_intercept(index).unwrap_or(f64::NAN), index))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            self.actives.clear();
            self.actives.extend(keyed.into_iter().map(|(_, index)| index));
            self.dirty = false;
        }

        &self.actives
    }

    /// Even-odd containment test.
    ///
    /// Moves the scanline to `y` and looks for a pair of consecutive active edges
    /// bracketing `x`, widened by `tolerance`.
    pub fn is_point_inside(&mut self, x: f64, y: f64, tolerance: f64) -> bool {
        self.scanline_to(y);
        self.actives();
        self.actives.chunks_exact(2).any(|pair| {
            match (self.x_intercept(pair[0]), self.x_intercept(pair[1])) {
                (Some(left), Some(right)) => left - tolerance <= x && x <= right + tolerance,
                _ => false,
            }
        })
    }
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn square(path: &mut Geomstr, min: f64, max: f64) {
    path.polyline(
        &[
            point(min, min),
            point(max, min),
            point(max, max),
            point(min, max),
        ],
        0,
    );
    path.close(0).unwrap();
}

#[test]
fn square_with_a_hole() {
    let mut path: Geomstr = Geomstr::new();
    square(&mut path, 0.0, 50.0);

    {
        let mut beam = Scanbeam::new(&path);
        assert!(beam.is_point_inside(25.0, 25.0, 1e-9));
        assert!(beam.is_point_inside(5.0, 25.0, 1e-9));
        assert!(!beam.is_point_inside(60.0, 25.0, 1e-9));
        assert!(!beam.is_point_inside(25.0, -5.0, 1e-9));
        assert!(!beam.is_point_inside(25.0, 55.0, 1e-9));
    }

    path.end();
    square(&mut path, 10.0, 40.0);

    let mut beam = Scanbeam::new(&path);
    assert_eq!(beam.events().len(), 8);
    assert!(!beam.is_point_inside(25.0, 25.0, 1e-9));
    assert!(beam.is_point_inside(5.0, 25.0, 1e-9));
    assert!(beam.is_point_inside(45.0, 45.0, 1e-9));
    assert!(!beam.is_point_inside(60.0, 25.0, 1e-9));
    // Moving back down.
    assert!(beam.is_point_inside(25.0, 5.0, 1e-9));
}

#[test]
fn actives_are_sorted_by_intercept() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(30.0, 0.0), point(0.0, 30.0), 0);
    path.line(point(10.0, 0.0), point(10.0, 30.0), 0);
    path.quad(point(20.0, 30.0), point(50.0, 15.0), point(20.0, 0.0), 0);
    path.vertex(0);
    path.line(point(0.0, 5.0), point(100.0, 5.0), 0);

    let mut beam = Scanbeam::new(&path);
    assert_eq!(beam.events().len(), 6);

    beam.scanline_to(5.0);
    assert_eq!(beam.actives(), &[1, 2, 0]);
    assert!((beam.x_intercept(0).unwrap() - 25.0).abs() < 1e-9);
    assert_eq!(beam.x_intercept(1), Some(10.0));
    assert_eq!(beam.x_intercept(3), None);
    assert_eq!(beam.x_intercept(4), None);

    beam.scanline_to(25.0);
    assert_eq!(beam.actives(), &[0, 1, 2]);
}

#[test]
fn half_open_extents() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(0.0, 10.0), 0);

    let mut beam = Scanbeam::new(&path);
    beam.scanline_to(0.0);
    assert_eq!(beam.actives(), &[0]);
    assert_eq!(beam.low(), 0.0);
    assert_eq!(beam.high(), 10.0);

    beam.scanline_to(10.0);
    assert!(beam.actives().is_empty());
    assert_eq!(beam.high(), f64::INFINITY);

    beam.scanline_to(-1.0);
    assert!(beam.actives().is_empty());
    assert_eq!(beam.low(), f64::NEG_INFINITY);
}

#[test]
fn backward_sweep_matches_forward_sweep() {
    let mut path: Geomstr = Geomstr::new();
    path.polyline(
        &[
            point(0.0, 0.0),
            point(20.0, 35.0),
            point(40.0, 5.0),
            point(55.0, 50.0),
            point(10.0, 45.0),
            point(30.0, 20.0),
        ],
        0,
    );
    path.close(0).unwrap();

    let mut swept = Scanbeam::new(&path);
    swept.scanline_to(60.0);
    assert!(swept.actives().is_empty());

    for &y in &[47.0, 35.0, 20.0, 12.5, 5.0, 0.0, 2.0, 40.0, -3.0] {
        swept.scanline_to(y);
        let mut fresh = Scanbeam::new(&path);
        fresh.scanline_to(y);
        assert_eq!(swept.actives(), fresh.actives());
        assert_eq!(swept.low(), fresh.low());
        assert_eq!(swept.high(), fresh.high());
    }

    while swept.decrement_scanbeam() {}
    assert!(swept.actives().is_empty());
    assert!(!swept.decrement_scanbeam());
}

#[test]
fn empty_store() {
    let path: Geomstr = Geomstr::new();
    let mut beam = Scanbeam::new(&path);
    assert_eq!(beam.low(), f64::NEG_INFINITY);
    assert_eq!(beam.high(), f64::INFINITY);
    assert!(!beam.increment_scanbeam());
    assert!(!beam.is_point_inside(0.0, 0.0, 1.0));
}

#[test]
fn starts_at_the_lowest_beam() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 5.0), point(10.0, 20.0), 0);
    path.line(point(20.0, 5.0), point(30.0, 12.0), 0);

    let mut beam = Scanbeam::new(&path);
    assert_eq!(beam.scanline(), 5.0);
    assert_eq!(beam.low(), 5.0);
    assert_eq!(beam.high(), 12.0);
    assert_eq!(beam.actives(), &[0, 1]);
}

#[cfg(test)]
fn ray_cast(path: &Geomstr, x: f64, y: f64) -> bool {
    let mut crossings = 0;
    for segment in path.iter() {
        let (from, to) = match (segment.start(), segment.end()) {
            (Some(from), Some(to)) if from.y != to.y => (from, to),
            _ => continue,
        };
        let (y_min, y_max) = (from.y.min(to.y), from.y.max(to.y));
        if y < y_min || y >= y_max {
            continue;
        }
        let t = (y - from.y) / (to.y - from.y);
        if from.x + (to.x - from.x) * t > x {
            crossings += 1;
        }
    }

    crossings % 2 == 1
}

#[cfg(test)]
fn assert_matches_ray_cast(path: &Geomstr) {
    let mut beam = Scanbeam::new(path);
    let mut inside = 0;
    for j in 0..60 {
        // Alternate the sweep direction between rows.
        for i in 0..60 {
            let i = if j % 2 == 0 { i } else { 59 - i };
            let x = i as f64 - 4.63;
            let y = j as f64 - 4.39;
            let expected = ray_cast(path, x, y);
            assert_eq!(beam.is_point_inside(x, y, 0.0), expected, "at ({}, {})", x, y);
            inside += expected as u32;
        }
    }
    assert!(inside > 0);
}

#[test]
fn even_odd_matches_ray_casting() {
    let mut u_shape: Geomstr = Geomstr::new();
    u_shape.polyline(
        &[
            point(0.0, 0.0),
            point(50.0, 0.0),
            point(50.0, 50.0),
            point(35.0, 50.0),
            point(35.0, 15.0),
            point(15.0, 15.0),
            point(15.0, 50.0),
            point(0.0, 50.0),
        ],
        0,
    );
    u_shape.close(0).unwrap();
    assert_matches_ray_cast(&u_shape);

    let mut sloped: Geomstr = Geomstr::new();
    sloped.polyline(
        &[
            point(0.0, 0.0),
            point(20.0, 35.0),
            point(40.0, 5.0),
            point(55.0, 50.0),
            point(10.0, 45.0),
            point(30.0, 20.0),
        ],
        0,
    );
    sloped.close(0).unwrap();
    assert_matches_ray_cast(&sloped);

    let mut holed: Geomstr = Geomstr::new();
    square(&mut holed, 0.0, 50.0);
    holed.end();
    square(&mut holed, 10.0, 40.0);
    assert_matches_ray_cast(&holed);
}

#[test]
fn sweeps_in_random_order() {
    use rand::{Rng, SeedableRng};

    let mut path: Geomstr = Geomstr::new();
    square(&mut path, 0.0, 50.0);
    path.end();
    square(&mut path, 10.0, 40.0);

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut beam = Scanbeam::new(&path);
    for _ in 0..500 {
        let x = rng.gen_range(-10.0..60.0);
        let y = rng.gen_range(-10.0..60.0);
        assert_eq!(beam.is_point_inside(x, y, 0.0), ray_cast(&path, x, y));
    }
}
