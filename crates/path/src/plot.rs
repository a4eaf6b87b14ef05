//! Conversion of a store into device grid coordinates.
//!
//! Every record is stepped on the integer grid with a Bresenham stepper, so two
//! consecutive pixels of a record are always one unit step apart (orthogonal or
//! diagonal). Curves and arcs are first sampled into waypoints, about one per unit of
//! length, and the waypoints are joined the same way lines are.

use crate::error::GeomstrError;
use crate::geom::{Evaluate, Primitive};
use crate::geomstr::Geomstr;
use crate::math::Point;
use crate::segment::Segment;

use core::slice;

/// A pixel on the device grid.
pub type Pixel = (i64, i64);

impl<P: Copy> Geomstr<P> {
    /// Lazily plots every record of the store.
    ///
    /// Yields `(x, y, settings)` for each pixel, in record order. Markers yield
    /// nothing.
    pub fn generator(&self) -> Plot<'_, P> {
        Plot {
            segments: self.iter(),
            pixels: Pixels::empty(),
            settings: None,
        }
    }
}

/// Iterator over the pixels of a store, see [`Geomstr::generator`].
pub struct Plot<'l, P> {
    segments: slice::Iter<'l, Segment<P>>,
    pixels: Pixels,
    settings: Option<P>,
}

impl<'l, P: Copy> Iterator for Plot<'l, P> {
    type Item = (i64, i64, P);

    fn next(&mut self) -> Option<(i64, i64, P)> {
        loop {
            if let Some(settings) = self.settings {
                if let Some((x, y)) = self.pixels.next() {
                    return Some((x, y, settings));
                }
            }

            let segment = self.segments.next()?;
            match (segment.to_primitive(), segment.settings()) {
                (Some(primitive), Some(settings)) => {
                    self.pixels = Pixels::new(waypoints(&primitive));
                    self.settings = Some(settings);
                }
                _ => {
                    self.settings = None;
                }
            }
        }
    }
}

fn rounded(p: Point) -> Pixel {
    (p.x.round() as i64, p.y.round() as i64)
}

/// Grid points a record goes through.
fn waypoints(primitive: &Primitive) -> Vec<Pixel> {
    match primitive {
        Primitive::Point(p) => vec![rounded(*p)],
        Primitive::Line(line) => vec![rounded(line.from), rounded(line.to)],
        _ => {
            let n = primitive.length().ceil().max(1.0) as usize;
            let step = 1.0 / n as f64;
            let mut points: Vec<Pixel> = (0..=n)
                .map(|i| rounded(primitive.sample(i as f64 * step)))
                .collect();
            points.dedup();
            points
        }
    }
}

/// Pixels along a sequence of waypoints. The pixel shared by two consecutive lines
/// is only produced once.
struct Pixels {
    waypoints: Vec<Pixel>,
    next_waypoint: usize,
    line: BresenhamLine,
}

impl Pixels {
    fn empty() -> Self {
        let mut line = BresenhamLine::new((0, 0), (0, 0));
        line.next();
        Pixels {
            waypoints: Vec::new(),
            next_waypoint: 0,
            line,
        }
    }

    fn new(waypoints: Vec<Pixel>) -> Self {
        let mut pixels = Pixels::empty();
        if let Some(&first) = waypoints.first() {
            pixels.line = BresenhamLine::new(first, first);
            pixels.next_waypoint = 1;
        }
        pixels.waypoints = waypoints;
        pixels
    }
}

impl Iterator for Pixels {
    type Item = Pixel;

    fn next(&mut self) -> Option<Pixel> {
        loop {
            if let Some(pixel) = self.line.next() {
                return Some(pixel);
            }
            if self.next_waypoint == 0 || self.next_waypoint >= self.waypoints.len() {
                return None;
            }

            let from = self.waypoints[self.next_waypoint - 1];
            let to = self.waypoints[self.next_waypoint];
            self.next_waypoint += 1;
            self.line = BresenhamLine::new(from, to);
            // Already produced by the previous line.
            self.line.next();
        }
    }
}

/// Integer line stepper, all octants, both end points included.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    x: i64,
    y: i64,
    to: Pixel,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    done: bool,
}

impl BresenhamLine {
    pub fn new(from: Pixel, to: Pixel) -> Self {
        let dx = (to.0 - from.0).abs();
        let dy = -(to.1 - from.1).abs();
        BresenhamLine {
            x: from.0,
            y: from.1,
            to,
            dx,
            dy,
            sx: if from.0 < to.0 { 1 } else { -1 },
            sy: if from.1 < to.1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = Pixel;

    fn next(&mut self) -> Option<Pixel> {
        if self.done {
            return None;
        }

        let pixel = (self.x, self.y);
        if pixel == self.to {
            self.done = true;
            return Some(pixel);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }

        Some(pixel)
    }
}

/// Expands orthogonal and diagonal moves between consecutive points into unit steps.
///
/// Repeated points are dropped. Returns an error if two consecutive points are
/// neither on the same row, column nor diagonal.
pub fn unit_steps(points: &[Pixel]) -> Result<Vec<Pixel>, GeomstrError> {
    let mut result = Vec::with_capacity(points.len());
    let mut iter = points.iter();
    let mut current = match iter.next() {
        Some(&first) => first,
        None => return Ok(result),
    };
    result.push(current);

    for &next in iter {
        let dx = next.0 - current.0;
        let dy = next.1 - current.1;
        if dx == 0 && dy == 0 {
            continue;
        }
        if dx != 0 && dy != 0 && dx.abs() != dy.abs() {
            return Err(GeomstrError::NonUnitStep {
                from: current,
                to: next,
            });
        }

        let (sx, sy) = (dx.signum(), dy.signum());
        for _ in 0..dx.abs().max(dy.abs()) {
            current = (current.0 + sx, current.1 + sy);
            result.push(current);
        }
    }

    Ok(result)
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn is_connected(pixels: &[Pixel]) -> bool {
    pixels
        .windows(2)
        .all(|w| (w[1].0 - w[0].0).abs() <= 1 && (w[1].1 - w[0].1).abs() <= 1 && w[0] != w[1])
}

#[test]
fn bresenham_octants() {
    for &to in &[
        (7, 3),
        (3, 7),
        (-3, 7),
        (-7, 3),
        (-7, -3),
        (-3, -7),
        (3, -7),
        (7, -3),
        (5, 0),
        (0, -5),
        (4, 4),
    ] {
        let pixels: Vec<Pixel> = BresenhamLine::new((0, 0), to).collect();
        assert_eq!(pixels.first(), Some(&(0, 0)));
        assert_eq!(pixels.last(), Some(&to));
        assert_eq!(pixels.len() as i64, to.0.abs().max(to.1.abs()) + 1);
        assert!(is_connected(&pixels));
    }

    let single: Vec<Pixel> = BresenhamLine::new((2, 2), (2, 2)).collect();
    assert_eq!(single, vec![(2, 2)]);
}

#[test]
fn plot_lines_and_points() {
    let mut path: Geomstr = Geomstr::new();
    path.point(point(1.4, 1.6), 7);
    path.end();
    path.line(point(0.0, 0.0), point(3.0, 0.0), 1);
    path.vertex(0);
    path.line(point(3.0, 0.0), point(3.0, 2.0), 2);

    let plotted: Vec<(i64, i64, usize)> = path.generator().collect();
    assert_eq!(
        plotted,
        vec![
            (1, 2, 7),
            (0, 0, 1),
            (1, 0, 1),
            (2, 0, 1),
            (3, 0, 1),
            (3, 0, 2),
            (3, 1, 2),
            (3, 2, 2),
        ]
    );
}

#[test]
fn plot_curves() {
    let mut path: Geomstr = Geomstr::new();
    path.quad(point(0.0, 0.0), point(20.0, 40.0), point(40.0, 0.0), 0);
    path.cubic(point(40.0, 0.0), point(50.0, -30.0), point(80.0, 30.0), point(90.0, 0.0), 1);
    path.arc(point(90.0, 0.0), point(100.0, 10.0), point(110.0, 0.0), 2);

    for index in 0..path.len() {
        let primitive = path.primitive(index).unwrap();
        let mut single: Geomstr = Geomstr::new();
        single.push(path.segment(index).copied().unwrap());
        let pixels: Vec<Pixel> = single.generator().map(|(x, y, _)| (x, y)).collect();

        assert!(is_connected(&pixels));
        assert_eq!(pixels.first(), Some(&rounded(primitive.from())));
        assert_eq!(pixels.last(), Some(&rounded(primitive.to())));
        assert!(pixels.len() as f64 >= primitive.length() / 2.0);
    }

    let settings: Vec<usize> = path.generator().map(|(_, _, s)| s).collect();
    assert!(settings.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn plot_markers_only() {
    let mut path: Geomstr = Geomstr::new();
    path.vertex(0);
    path.end();
    assert_eq!(path.generator().count(), 0);
}

#[test]
fn expand_unit_steps() {
    assert_eq!(unit_steps(&[]), Ok(vec![]));
    assert_eq!(
        unit_steps(&[(0, 0), (0, 0), (3, 0), (1, 2), (1, 2), (1, 0)]),
        Ok(vec![
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (2, 1),
            (1, 2),
            (1, 1),
            (1, 0),
        ])
    );
    assert_eq!(
        unit_steps(&[(0, 0), (1, 1), (3, 2)]),
        Err(GeomstrError::NonUnitStep {
            from: (1, 1),
            to: (3, 2),
        })
    );
}
