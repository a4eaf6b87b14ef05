//! The segment store.

use crate::error::GeomstrError;
use crate::geom::arrayvec::ArrayVec;
use crate::geom::{Evaluate, IntersectionOptions, LineSegment, Primitive};
use crate::math::{boxes_overlap, Angle, Box2D, Point, Transform, Vector};
use crate::segment::{Connection, Segment, VertexId};

#[cfg(test)]
use crate::segment::SegmentKind;

use core::ops::Range;
use core::slice;

/// Improvements smaller than this are ignored by the travel optimizer.
const TWO_OPT_EPSILON: f64 = 1e-10;

/// A growable array of segment records.
///
/// The store keeps track of its own capacity: appending past it doubles it, and
/// [`trim`](Geomstr::trim) shrinks it down to the number of records.
///
/// `P` is the type of the settings handle attached to geometric records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Geomstr<P = usize> {
    segments: Vec<Segment<P>>,
    capacity: usize,
}

/// A crossing between a line of a store and a line of another store.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub position: Point,
    pub self_index: usize,
    pub other_index: usize,
    pub self_t: f64,
    pub other_t: f64,
    /// Running identifier, in discovery order.
    pub id: VertexId,
}

impl<P: Copy> Default for Geomstr<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy> Geomstr<P> {
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Creates an empty store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Geomstr {
            segments: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a store holding the given records, with no spare capacity.
    pub fn from_segments(segments: Vec<Segment<P>>) -> Self {
        let capacity = segments.len();
        Geomstr { segments, capacity }
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of records the store can hold before growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every record, keeping the capacity.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Shrinks the capacity to the number of records.
    pub fn trim(&mut self) {
        self.capacity = self.segments.len();
        self.segments.shrink_to_fit();
    }

    #[inline]
    pub fn segment(&self, index: usize) -> Option<&Segment<P>> {
        self.segments.get(index)
    }

    #[inline]
    pub fn segments(&self) -> &[Segment<P>] {
        &self.segments
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<Segment<P>> {
        self.segments.iter()
    }

    /// Iterates over the maximal runs of records that contain no end marker.
    pub fn runs(&self) -> impl Iterator<Item = &[Segment<P>]> {
        self.segments
            .split(|segment| matches!(segment, Segment::End))
            .filter(|run| !run.is_empty())
    }

    fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.segments.len() + additional;
        if needed <= self.capacity {
            return;
        }
        let mut capacity = self.capacity.max(1);
        while capacity < needed {
            capacity *= 2;
        }
        self.segments.reserve_exact(capacity - self.segments.len());
        self.capacity = capacity;
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, segment: Segment<P>) -> usize {
        self.ensure_capacity(1);
        self.segments.push(segment);
        self.segments.len() - 1
    }

    pub fn line(&mut self, from: Point, to: Point, settings: P) -> usize {
        self.push(Segment::Line { from, to, settings })
    }

    pub fn quad(&mut self, from: Point, ctrl: Point, to: Point, settings: P) -> usize {
        self.push(Segment::Quadratic {
            from,
            ctrl,
            to,
            settings,
        })
    }

    pub fn cubic(&mut self, from: Point, ctrl1: Point, ctrl2: Point, to: Point, settings: P) -> usize {
        self.push(Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
            settings,
        })
    }

    /// Appends an arc from `from` to `to` passing through `ctrl`.
    ///
    /// If `from == to` the arc is a full circle through `ctrl`.
    pub fn arc(&mut self, from: Point, ctrl: Point, to: Point, settings: P) -> usize {
        self.push(Segment::Arc {
            from,
            ctrl,
            to,
            settings,
        })
    }

    pub fn point(&mut self, at: Point, settings: P) -> usize {
        self.push(Segment::Point { at, settings })
    }

    pub fn vertex(&mut self, id: VertexId) -> usize {
        self.push(Segment::Vertex { id })
    }

    pub fn end(&mut self) -> usize {
        self.push(Segment::End)
    }

    /// Closes the last run.
    ///
    /// Appends a line from the end of the last record of the run back to the start of
    /// its first record if they differ.
    pub fn close(&mut self, settings: P) -> Result<(), GeomstrError> {
        if self.segments.is_empty() {
            return Err(GeomstrError::EmptyStore);
        }

        let run_start = self
            .segments
            .iter()
            .rposition(|segment| matches!(segment, Segment::End))
            .map_or(0, |index| index + 1);
        let run = &self.segments[run_start..];
        let first = run.iter().find_map(Segment::start);
        let last = run.iter().rev().find_map(Segment::end);

        if let (Some(first), Some(last)) = (first, last) {
            if first != last {
                self.line(last, first, settings);
            }
        }

        Ok(())
    }

    /// Appends one line per pair of consecutive points.
    pub fn polyline(&mut self, points: &[Point], settings: P) {
        self.ensure_capacity(points.len().saturating_sub(1));
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], settings);
        }
    }

    /// Appends copies of all records of another store.
    pub fn append(&mut self, other: &Geomstr<P>) {
        self.ensure_capacity(other.len());
        self.segments.extend_from_slice(&other.segments);
    }

    /// Reverses the order of the records and the direction of each of them.
    pub fn reverse(&mut self) {
        self.segments.reverse();
        for segment in &mut self.segments {
            *segment = segment.reversed();
        }
    }

    /// How the records at `a` and `b` are connected.
    ///
    /// Any end marker from `a` to `b` inclusive is a break. Otherwise a vertex at
    /// either index makes them meet at that vertex, and a travel move joins them in
    /// the remaining cases.
    pub fn segments_between(&self, a: usize, b: usize) -> Result<Connection, GeomstrError> {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        self.check_index(b)?;

        let range = &self.segments[a..=b];
        if range.iter().any(|segment| matches!(segment, Segment::End)) {
            return Ok(Connection::Break);
        }

        Ok(Connection::between(&self.segments[a], &self.segments[b]))
    }

    fn check_index(&self, index: usize) -> Result<(), GeomstrError> {
        if index >= self.segments.len() {
            return Err(GeomstrError::IndexOutOfBounds {
                index,
                len: self.segments.len(),
            });
        }
        Ok(())
    }

    /// The geometry of the record at `index`.
    pub fn primitive(&self, index: usize) -> Result<Primitive, GeomstrError> {
        self.check_index(index)?;
        self.segments[index]
            .to_primitive()
            .ok_or(GeomstrError::NotAPrimitive { index })
    }

    pub fn position(&self, index: usize, t: f64) -> Result<Point, GeomstrError> {
        Ok(self.primitive(index)?.sample(t))
    }

    /// Positions of the record at `index` for each of the parameters.
    pub fn positions(&self, index: usize, ts: &[f64]) -> Result<Vec<Point>, GeomstrError> {
        Ok(self.primitive(index)?.sample_all(ts))
    }

    pub fn derivative(&self, index: usize, t: f64, n: u32) -> Result<Vector, GeomstrError> {
        Ok(Evaluate::derivative(&self.primitive(index)?, t, n))
    }

    pub fn curvature(&self, index: usize, t: f64) -> Result<f64, GeomstrError> {
        Ok(self.primitive(index)?.curvature(t)?)
    }

    pub fn tangent(&self, index: usize, t: f64) -> Result<Vector, GeomstrError> {
        Ok(self.primitive(index)?.tangent(t)?)
    }

    pub fn length(&self, index: usize) -> Result<f64, GeomstrError> {
        Ok(self.primitive(index)?.length())
    }

    pub fn segment_bbox(&self, index: usize) -> Result<Box2D, GeomstrError> {
        Ok(self.primitive(index)?.bounding_box())
    }

    /// Power basis coefficients of the record at `index`, `None` for arcs.
    pub fn polynomial(&self, index: usize) -> Result<Option<ArrayVec<Vector, 4>>, GeomstrError> {
        Ok(self.primitive(index)?.polynomial_coefficients())
    }

    /// Intersections between the record at `index` and an arbitrary record, as pairs
    /// of parameters `(t_self, t_other)`.
    pub fn intersections(
        &self,
        index: usize,
        other: &Segment<P>,
        options: &IntersectionOptions,
    ) -> Result<Vec<(f64, f64)>, GeomstrError> {
        let primitive = self.primitive(index)?;
        Ok(match other.to_primitive() {
            Some(other) => crate::geom::intersections(&primitive, &other, options),
            None => Vec::new(),
        })
    }

    /// Smallest rectangle containing every record, `None` if the store has no geometry.
    pub fn bbox(&self) -> Option<Box2D> {
        self.segments
            .iter()
            .filter_map(Segment::to_primitive)
            .map(|primitive| primitive.bounding_box())
            .reduce(|a, b| a.union(&b))
    }

    /// Sum of the lengths of all geometric records.
    pub fn raw_length(&self) -> f64 {
        self.segments
            .iter()
            .filter_map(Segment::to_primitive)
            .map(|primitive| primitive.length())
            .sum()
    }

    /// Sum of the implicit travel moves between consecutive records.
    pub fn travel_distance(&self) -> f64 {
        (1..self.segments.len())
            .filter_map(|index| self.segments_between(index - 1, index).ok())
            .map(|connection| connection.distance())
            .sum()
    }

    /// Applies an affine transform to every position.
    pub fn transform(&mut self, transform: &Transform) {
        for segment in &mut self.segments {
            *segment = segment.transformed(transform);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let offset = Vector::new(dx, dy);
        for segment in &mut self.segments {
            *segment = segment.map_points(|p| p + offset);
        }
    }

    /// Scales every position by the same factor around `origin`.
    pub fn uniform_scale(&mut self, scale: f64, origin: Point) {
        for segment in &mut self.segments {
            *segment = segment.map_points(|p| origin + (p - origin) * scale);
        }
    }

    /// Rotates every position around the origin.
    pub fn rotate(&mut self, angle: Angle) {
        let (sin, cos) = angle.sin_cos();
        for segment in &mut self.segments {
            *segment = segment.map_points(|p| Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos));
        }
    }

    /// Reduces the travel distance by reversing sub-runs of records (2-opt).
    ///
    /// Every pass tries all the reversals and applies those that shorten the total
    /// travel. Stops after `max_passes` passes or as soon as a pass finds no
    /// improvement, and returns the resulting travel distance.
    ///
    /// Markers never move: reversed ranges contain no marker, and the records
    /// touching a vertex marker stay in place.
    pub fn two_opt_distance(&mut self, max_passes: usize) -> f64 {
        let blocks = self.reversible_blocks();
        for pass in 0..max_passes {
            let mut improvement = 0.0;
            for block in &blocks {
                for i in block.clone() {
                    for j in i..block.end {
                        let delta = self.reversal_delta(i, j);
                        if delta < -TWO_OPT_EPSILON {
                            self.reverse_range(i, j);
                            improvement -= delta;
                        }
                    }
                }
            }

            log::debug!("2-opt pass {pass}: travel reduced by {improvement}");
            if improvement == 0.0 {
                break;
            }
        }

        self.travel_distance()
    }

    /// Ranges of records 2-opt is allowed to reorder.
    fn reversible_blocks(&self) -> Vec<Range<usize>> {
        let len = self.segments.len();
        let is_vertex = |index: usize| matches!(self.segments[index], Segment::Vertex { .. });

        let mut blocks = Vec::new();
        let mut start = 0;
        for index in 0..=len {
            if index < len && !self.segments[index].kind().is_marker() {
                continue;
            }

            let mut lo = start;
            let mut hi = index;
            if lo > 0 && is_vertex(lo - 1) {
                lo += 1;
            }
            if hi < len && is_vertex(hi) && hi > lo {
                hi -= 1;
            }
            if lo < hi {
                blocks.push(lo..hi);
            }
            start = index + 1;
        }

        blocks
    }

    /// Change of travel distance if the records `i..=j` were reversed.
    fn reversal_delta(&self, i: usize, j: usize) -> f64 {
        let first = &self.segments[i];
        let last = &self.segments[j];
        let mut before = 0.0;
        let mut after = 0.0;
        if i > 0 {
            let prev = &self.segments[i - 1];
            before += gap(prev, first);
            after += gap(prev, &last.reversed());
        }
        if j + 1 < self.segments.len() {
            let next = &self.segments[j + 1];
            before += gap(last, next);
            after += gap(&first.reversed(), next);
        }

        after - before
    }

    fn reverse_range(&mut self, i: usize, j: usize) {
        let range = &mut self.segments[i..=j];
        range.reverse();
        for segment in range {
            *segment = segment.reversed();
        }
    }

    /// Finds the crossings between the lines of this store and the lines of another.
    ///
    /// Other primitives are ignored. Results are in discovery order and numbered from
    /// zero.
    pub fn find_intersections(&self, other: &Geomstr<P>) -> Vec<Intersection> {
        let other_lines: Vec<(usize, LineSegment, Box2D)> = other
            .segments
            .iter()
            .enumerate()
            .filter_map(|(index, segment)| match *segment {
                Segment::Line { from, to, .. } => {
                    let line = LineSegment { from, to };
                    Some((index, line, line.bounding_box()))
                }
                _ => None,
            })
            .collect();

        let mut result = Vec::new();
        for (self_index, segment) in self.segments.iter().enumerate() {
            let line = match *segment {
                Segment::Line { from, to, .. } => LineSegment { from, to },
                _ => continue,
            };
            let bb = line.bounding_box();
            for (other_index, other_line, other_bb) in &other_lines {
                if !boxes_overlap(&bb, other_bb) {
                    continue;
                }
                if let Some((self_t, other_t)) = line.intersection_t(other_line) {
                    result.push(Intersection {
                        position: line.sample(self_t),
                        self_index,
                        other_index: *other_index,
                        self_t,
                        other_t,
                        id: result.len(),
                    });
                }
            }
        }

        result
    }

    /// Merges another store into this one.
    ///
    /// Every line of either store that crosses a line of the other one is split at the
    /// crossings, with a vertex marker at each of them. Both sides of a crossing use
    /// the same vertex id, numbered after the ids already present in either store. The
    /// records of this store come first, followed by an end marker and the records of
    /// `other`. The result has no spare capacity.
    pub fn merge(&mut self, other: &Geomstr<P>) {
        let intersections = self.find_intersections(other);
        let first_id = self
            .segments
            .iter()
            .chain(other.segments.iter())
            .filter_map(|segment| match segment {
                Segment::Vertex { id } => Some(id + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        let mut self_hits = vec![Vec::new(); self.len()];
        let mut other_hits = vec![Vec::new(); other.len()];
        for hit in &intersections {
            let id = first_id + hit.id;
            self_hits[hit.self_index].push((hit.self_t, id, hit.position));
            other_hits[hit.other_index].push((hit.other_t, id, hit.position));
        }

        let mut merged = Geomstr::with_capacity(self.len() + other.len() + 4 * intersections.len() + 1);
        merged.append_split(&self.segments, &mut self_hits);
        merged.end();
        merged.append_split(&other.segments, &mut other_hits);
        merged.trim();

        log::debug!(
            "merged {} and {} records with {} intersections into {} records",
            self.len(),
            other.len(),
            intersections.len(),
            merged.len()
        );

        *self = merged;
    }

    fn append_split(&mut self, segments: &[Segment<P>], hits: &mut [Vec<(f64, VertexId, Point)>]) {
        for (segment, hits) in segments.iter().zip(hits.iter_mut()) {
            let (from, to, settings) = match *segment {
                Segment::Line { from, to, settings } if !hits.is_empty() => (from, to, settings),
                _ => {
                    self.push(*segment);
                    continue;
                }
            };

            hits.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut current = from;
            for &(_, id, position) in hits.iter() {
                self.line(current, position, settings);
                self.vertex(id);
                current = position;
            }
            self.line(current, to, settings);
        }
    }
}

/// Travel between two consecutive records.
fn gap<P: Copy>(a: &Segment<P>, b: &Segment<P>) -> f64 {
    Connection::between(a, b).distance()
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn square(size: f64) -> Geomstr {
    let mut path = Geomstr::new();
    path.polyline(
        &[
            point(0.0, 0.0),
            point(size, 0.0),
            point(size, size),
            point(0.0, size),
        ],
        0,
    );
    path.close(0).unwrap();
    path
}

#[test]
fn capacity_doubles() {
    let mut path: Geomstr = Geomstr::with_capacity(2);
    for i in 0..5 {
        path.point(point(i as f64, 0.0), 0);
    }
    assert_eq!(path.len(), 5);
    assert_eq!(path.capacity(), 8);

    let mut path: Geomstr = Geomstr::with_capacity(0);
    path.end();
    assert_eq!(path.capacity(), 1);
}

#[test]
fn trim_is_idempotent() {
    let mut path = square(10.0);
    assert_eq!(path.capacity(), Geomstr::<usize>::DEFAULT_CAPACITY);

    path.trim();
    assert_eq!(path.capacity(), path.len());
    let snapshot = path.clone();

    path.trim();
    assert_eq!(path, snapshot);
    assert_eq!(path.capacity(), path.len());
}

#[test]
fn close() {
    let mut path: Geomstr = Geomstr::new();
    assert_eq!(path.close(0), Err(GeomstrError::EmptyStore));

    path.line(point(0.0, 0.0), point(10.0, 0.0), 1);
    path.line(point(10.0, 0.0), point(10.0, 10.0), 1);
    path.close(2).unwrap();
    assert_eq!(
        path.segment(2),
        Some(&Segment::Line {
            from: point(10.0, 10.0),
            to: point(0.0, 0.0),
            settings: 2,
        })
    );

    // Already closed.
    path.close(2).unwrap();
    assert_eq!(path.len(), 3);

    // Only the last run is considered.
    path.end();
    path.line(point(20.0, 0.0), point(30.0, 0.0), 1);
    path.close(1).unwrap();
    assert_eq!(path.len(), 6);
    assert_eq!(path.segment(5).and_then(Segment::end), Some(point(20.0, 0.0)));

    // A run without geometry is left alone.
    path.end();
    path.close(1).unwrap();
    assert_eq!(path.len(), 7);
}

#[test]
fn translate_round_trip() {
    let mut path = square(10.0);
    path.quad(point(1.5, 2.25), point(3.0, 4.0), point(5.0, -6.5), 0);
    path.cubic(point(0.0, 0.0), point(1.0, 8.0), point(7.0, 3.0), point(4.0, 4.0), 1);
    path.arc(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), 2);
    path.vertex(3);
    path.end();
    path.point(point(0.125, 0.5), 3);

    let original = path.clone();
    path.translate(12.5, -3.75);
    assert_ne!(path, original);
    path.translate(-12.5, 3.75);
    assert_eq!(path, original);
}

#[test]
fn rotate_matches_transform() {
    let mut rotated = square(10.0);
    rotated.cubic(point(0.0, 0.0), point(1.0, 8.0), point(7.0, 3.0), point(4.0, 4.0), 1);
    rotated.arc(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), 2);
    let mut transformed = rotated.clone();

    let angle = Angle::degrees(33.0);
    rotated.rotate(angle);
    transformed.transform(&Transform::rotation(angle));

    for (a, b) in rotated.iter().zip(transformed.iter()) {
        assert_eq!(a.kind(), b.kind());
        let (a, b) = (a.to_primitive().unwrap(), b.to_primitive().unwrap());
        for i in 0..=4 {
            let t = i as f64 / 4.0;
            assert!((a.sample(t) - b.sample(t)).length() < 1e-9);
        }
    }
}

#[test]
fn uniform_scale_around_a_point() {
    let mut path = square(10.0);
    path.uniform_scale(2.0, point(5.0, 5.0));
    let bb = path.bbox().unwrap();
    assert_eq!(bb.min, point(-5.0, -5.0));
    assert_eq!(bb.max, point(15.0, 15.0));
    assert_eq!(path.raw_length(), 80.0);
}

#[test]
fn lengths_and_bbox() {
    let mut path: Geomstr = Geomstr::new();
    assert!(path.bbox().is_none());

    path.line(point(0.0, 0.0), point(3.0, 4.0), 0);
    path.line(point(6.0, 4.0), point(6.0, 0.0), 0);
    path.end();
    path.line(point(100.0, 100.0), point(101.0, 100.0), 0);

    assert_eq!(path.raw_length(), 10.0);
    // The break does not count as travel.
    assert_eq!(path.travel_distance(), 3.0);
    assert_eq!(path.length(0), Ok(5.0));
    assert_eq!(path.length(2), Err(GeomstrError::NotAPrimitive { index: 2 }));
    assert_eq!(
        path.length(9),
        Err(GeomstrError::IndexOutOfBounds { index: 9, len: 4 })
    );

    let bb = path.bbox().unwrap();
    assert_eq!(bb.min, point(0.0, 0.0));
    assert_eq!(bb.max, point(101.0, 100.0));
}

#[test]
fn adjacency() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(1.0, 0.0), 0);
    path.line(point(2.0, 0.0), point(3.0, 0.0), 0);
    path.vertex(4);
    path.line(point(3.0, 0.0), point(3.0, 3.0), 0);
    path.end();
    path.line(point(9.0, 9.0), point(8.0, 8.0), 0);

    assert_eq!(
        path.segments_between(0, 1),
        Ok(Connection::Travel {
            from: point(1.0, 0.0),
            to: point(2.0, 0.0),
        })
    );
    assert_eq!(path.segments_between(1, 2), Ok(Connection::Vertex(4)));
    assert_eq!(path.segments_between(3, 5), Ok(Connection::Break));
    assert!(path.segments_between(5, 6).is_err());
    assert_eq!(path.runs().count(), 2);
}

#[test]
fn per_index_evaluators() {
    let mut path: Geomstr = Geomstr::new();
    path.quad(point(0.0, 0.0), point(5.0, 10.0), point(10.0, 0.0), 0);
    path.vertex(0);

    assert_eq!(path.position(0, 0.5), Ok(point(5.0, 5.0)));
    assert_eq!(
        path.positions(0, &[0.0, 1.0]),
        Ok(vec![point(0.0, 0.0), point(10.0, 0.0)])
    );
    assert_eq!(path.derivative(0, 0.5, 1), Ok(Vector::new(10.0, 0.0)));
    assert_eq!(path.tangent(0, 0.5), Ok(Vector::new(1.0, 0.0)));
    assert!(path.curvature(0, 0.5).is_ok());
    assert_eq!(path.polynomial(0).map(|c| c.map(|c| c.len())), Ok(Some(3)));
    assert_eq!(
        path.position(1, 0.5),
        Err(GeomstrError::NotAPrimitive { index: 1 })
    );

    let crossing = Segment::Line {
        from: point(0.0, 2.5),
        to: point(10.0, 2.5),
        settings: 0,
    };
    let hits = path
        .intersections(0, &crossing, &IntersectionOptions::DEFAULT)
        .unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn two_opt_removes_avoidable_travel() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(50.0, 0.0), 0);
    path.line(point(50.0, 50.0), point(50.0, 0.0), 0);
    assert_eq!(path.travel_distance(), 50.0);

    assert_eq!(path.two_opt_distance(10), 0.0);
    assert_eq!(path.travel_distance(), 0.0);
}

#[test]
fn two_opt_never_increases_travel() {
    let mut path: Geomstr = Geomstr::new();
    let coords = [
        (3.0, 7.0, 10.0, 2.0),
        (40.0, 40.0, 41.0, 45.0),
        (9.0, 1.0, 0.0, 0.0),
        (44.0, 46.0, 20.0, 20.0),
        (21.0, 19.0, 3.0, 8.0),
        (100.0, 0.0, 90.0, 0.0),
    ];
    for &(x0, y0, x1, y1) in &coords {
        path.line(point(x0, y0), point(x1, y1), 0);
    }
    path.end();
    path.line(point(0.0, 0.0), point(1.0, 1.0), 0);

    let mut previous = path.travel_distance();
    for _ in 0..4 {
        let current = path.two_opt_distance(1);
        assert!(current <= previous + 1e-9);
        previous = current;
    }
    assert_eq!(path.len(), coords.len() + 2);
    assert!((path.raw_length() - total_length(&coords)).abs() < 1e-9);
}

#[test]
fn two_opt_keeps_markers_in_place() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(10.0, 0.0), 0);
    path.line(point(60.0, 0.0), point(70.0, 0.0), 0);
    path.end();
    assert_eq!(path.travel_distance(), 50.0);

    // Moving the end marker between the lines would hide the travel without
    // shortening it.
    assert_eq!(path.two_opt_distance(10), 50.0);
    let kinds: Vec<SegmentKind> = path.iter().map(Segment::kind).collect();
    assert_eq!(kinds, vec![SegmentKind::Line, SegmentKind::Line, SegmentKind::End]);

    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(10.0, 0.0), 0);
    path.vertex(1);
    path.line(point(10.0, 0.0), point(20.0, 0.0), 0);
    path.line(point(50.0, 0.0), point(40.0, 0.0), 0);
    path.end();
    path.line(point(0.0, 5.0), point(1.0, 5.0), 0);
    let original = path.clone();
    assert_eq!(path.travel_distance(), 30.0);

    assert_eq!(path.two_opt_distance(10), 20.0);
    for index in [0, 1, 2, 4, 5] {
        assert_eq!(path.segment(index), original.segment(index));
    }
    assert_eq!(
        path.segment(3),
        Some(&Segment::Line {
            from: point(40.0, 0.0),
            to: point(50.0, 0.0),
            settings: 0,
        })
    );
}

#[cfg(test)]
fn total_length(coords: &[(f64, f64, f64, f64)]) -> f64 {
    coords
        .iter()
        .map(|&(x0, y0, x1, y1)| (point(x1, y1) - point(x0, y0)).length())
        .sum::<f64>()
        + 2.0f64.sqrt()
}

#[test]
fn reverse_flips_records() {
    let mut path: Geomstr = Geomstr::new();
    path.line(point(0.0, 0.0), point(1.0, 0.0), 0);
    path.quad(point(1.0, 0.0), point(2.0, 1.0), point(3.0, 0.0), 1);
    path.reverse();

    assert_eq!(path.segment(0).and_then(Segment::start), Some(point(3.0, 0.0)));
    assert_eq!(path.segment(1).and_then(Segment::end), Some(point(0.0, 0.0)));
    assert_eq!(path.travel_distance(), 0.0);
}

#[test]
fn find_line_intersections() {
    let mut a: Geomstr = Geomstr::new();
    a.line(point(0.0, 0.0), point(100.0, 100.0), 0);
    let mut b: Geomstr = Geomstr::new();
    b.line(point(100.0, 0.0), point(0.0, 100.0), 0);
    b.quad(point(0.0, 0.0), point(50.0, 50.0), point(100.0, 0.0), 0);

    let hits = a.find_intersections(&b);
    assert_eq!(
        hits,
        vec![Intersection {
            position: point(50.0, 50.0),
            self_index: 0,
            other_index: 0,
            self_t: 0.5,
            other_t: 0.5,
            id: 0,
        }]
    );
}

#[test]
fn merge_splits_lines_at_crossings() {
    // Two squares overlapping at a corner: their outlines cross twice.
    let mut a = square(10.0);
    let mut b = square(10.0);
    b.translate(5.0, 5.0);
    b.point(point(-3.0, -3.0), 0);

    let hits = a.find_intersections(&b).len();
    assert_eq!(hits, 2);

    let (len_a, len_b) = (a.len(), b.len());
    a.merge(&b);
    assert_eq!(a.len(), len_a + len_b + 4 * hits + 1);
    assert_eq!(a.capacity(), a.len());

    // Each crossing is a vertex on both sides.
    let vertices: Vec<VertexId> = a
        .iter()
        .filter_map(|segment| match segment {
            Segment::Vertex { id } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(vertices, vec![0, 1, 0, 1]);

    // The lines are split, not moved.
    assert!((a.raw_length() - 80.0).abs() < 1e-9);
    assert_eq!(a.runs().count(), 2);
}

#[test]
fn merge_numbers_vertices_after_existing_ones() {
    let mut a: Geomstr = Geomstr::new();
    a.line(point(0.0, 0.0), point(10.0, 10.0), 0);
    a.vertex(6);
    let mut b: Geomstr = Geomstr::new();
    b.line(point(10.0, 0.0), point(0.0, 10.0), 0);

    a.merge(&b);
    assert_eq!(a.segment(1), Some(&Segment::Vertex { id: 7 }));
    assert_eq!(a.segment(6), Some(&Segment::Vertex { id: 7 }));
}
