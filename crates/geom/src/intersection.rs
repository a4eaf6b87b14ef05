//! Intersections between pairs of primitives.
//!
//! Lines against lines, quadratic and cubic béziers are solved in closed form. Every
//! other pairing goes through a sampling solver: both primitives are approximated with
//! polylines, the crossings of the polylines are located, and the parameter ranges
//! around each crossing are sampled again a bounded number of times to refine it.

use crate::line::LineSegment;
use crate::math::{boxes_overlap, Point};
use crate::primitive::{Evaluate, Primitive};
use crate::utils::{cubic_polynomial_roots, quadratic_polynomial_roots};

use arrayvec::ArrayVec;
use core::ops::Range;

/// Tolerance on the parameter of a root found slightly outside of `[0, 1]`.
const ROOT_TOLERANCE: f64 = 1e-9;

/// Parameters of the sampling solver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct IntersectionOptions {
    /// Number of samples taken on each primitive at every refinement level.
    ///
    /// Default value: `IntersectionOptions::DEFAULT_SAMPLES`.
    pub samples: usize,

    /// Maximum number of times a crossing is refined after the first sampling.
    ///
    /// Default value: `IntersectionOptions::DEFAULT_ENHANCEMENTS`.
    pub enhancements: u32,

    /// Refinement stops when the distance in t between two samples gets smaller
    /// than this value.
    ///
    /// Default value: `IntersectionOptions::DEFAULT_MIN_STEP`.
    pub min_step: f64,

    /// Intersections closer than this on both primitives (in t) are reported once.
    ///
    /// Default value: `IntersectionOptions::DEFAULT_DEDUP_TOLERANCE`.
    pub dedup_tolerance: f64,
}

impl IntersectionOptions {
    pub const DEFAULT_SAMPLES: usize = 50;
    pub const DEFAULT_ENHANCEMENTS: u32 = 2;
    pub const DEFAULT_MIN_STEP: f64 = 1e-10;
    pub const DEFAULT_DEDUP_TOLERANCE: f64 = 1e-6;

    pub const DEFAULT: Self = IntersectionOptions {
        samples: Self::DEFAULT_SAMPLES,
        enhancements: Self::DEFAULT_ENHANCEMENTS,
        min_step: Self::DEFAULT_MIN_STEP,
        dedup_tolerance: Self::DEFAULT_DEDUP_TOLERANCE,
    };

    #[inline]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    #[inline]
    pub fn with_enhancements(mut self, enhancements: u32) -> Self {
        self.enhancements = enhancements;
        self
    }

    #[inline]
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    #[inline]
    pub fn with_dedup_tolerance(mut self, tolerance: f64) -> Self {
        self.dedup_tolerance = tolerance;
        self
    }
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Computes the intersections between two primitives.
///
/// Returns the pairs `(t_a, t_b)` such that `a.sample(t_a)` and `b.sample(t_b)` are the
/// same point. Points never intersect anything. Parallel and overlapping lines are
/// not considered to intersect.
pub fn intersections(a: &Primitive, b: &Primitive, options: &IntersectionOptions) -> Vec<(f64, f64)> {
    if matches!(a, Primitive::Point(_)) || matches!(b, Primitive::Point(_)) {
        return Vec::new();
    }

    if a.is_polynomial() && b.is_polynomial() && !boxes_overlap(&a.bounding_box(), &b.bounding_box()) {
        return Vec::new();
    }

    match (a, b) {
        (Primitive::Line(l1), Primitive::Line(l2)) => l1.intersection_t(l2).into_iter().collect(),
        (Primitive::Line(line), Primitive::Quadratic(_) | Primitive::Cubic(_)) => {
            line_curve_intersections(line, b).into_iter().collect()
        }
        (Primitive::Quadratic(_) | Primitive::Cubic(_), Primitive::Line(line)) => {
            line_curve_intersections(line, a)
                .into_iter()
                .map(|(t_line, t_curve)| (t_curve, t_line))
                .collect()
        }
        _ => {
            let mut result = Vec::new();
            refine(a, b, 0.0..1.0, 0.0..1.0, 0, options, &mut result);
            dedup_intersections(&mut result, options.dedup_tolerance);
            result
        }
    }
}

/// Intersections of a line with a quadratic or cubic bézier curve, as
/// `(t_line, t_curve)` pairs sorted by `t_curve`.
///
/// The curve is moved into a frame where the line lies on the positive x axis, where
/// the crossings are the roots of the y polynomial.
pub fn line_curve_intersections(line: &LineSegment, curve: &Primitive) -> ArrayVec<(f64, f64), 3> {
    let mut result = ArrayVec::new();

    let length = line.length();
    if length == 0.0 {
        return result;
    }

    let aligned = curve.transformed(&line.to_x_axis());
    let coefficients = match aligned.polynomial_coefficients() {
        Some(coefficients) => coefficients,
        None => return result,
    };

    let roots: ArrayVec<f64, 3> = match coefficients.as_slice() {
        [c0, c1, c2] => quadratic_polynomial_roots(c2.y, c1.y, c0.y).into_iter().collect(),
        [c0, c1, c2, c3] => cubic_polynomial_roots(c3.y, c2.y, c1.y, c0.y),
        _ => return result,
    };

    for t in roots {
        if !(-ROOT_TOLERANCE..=1.0 + ROOT_TOLERANCE).contains(&t) {
            continue;
        }
        let t = t.clamp(0.0, 1.0);
        let x = aligned.sample(t).x;
        if x < -ROOT_TOLERANCE * length || x > length * (1.0 + ROOT_TOLERANCE) {
            continue;
        }
        result.push(((x / length).clamp(0.0, 1.0), t));
    }

    result
}

/// Finds the crossings between two polylines.
///
/// Returns `(i, j, s, u)` tuples where the crossing is at parameter `s` of the segment
/// `a[i]..a[i + 1]` and at parameter `u` of `b[j]..b[j + 1]`.
pub fn polyline_intersections(a: &[Point], b: &[Point]) -> Vec<(usize, usize, f64, f64)> {
    let mut result = Vec::new();
    let b_segments: Vec<LineSegment> = b.windows(2).map(|w| LineSegment::new(w[0], w[1])).collect();
    let b_boxes: Vec<_> = b_segments.iter().map(|s| s.bounding_box()).collect();

    for (i, w) in a.windows(2).enumerate() {
        let segment = LineSegment::new(w[0], w[1]);
        let bb = segment.bounding_box();
        for (j, other) in b_segments.iter().enumerate() {
            if !boxes_overlap(&bb, &b_boxes[j]) {
                continue;
            }
            if let Some((s, u)) = segment.intersection_t(other) {
                result.push((i, j, s, u));
            }
        }
    }

    result
}

fn sample_range(primitive: &Primitive, range: &Range<f64>, samples: usize) -> (Vec<f64>, Vec<Point>, f64) {
    let step = (range.end - range.start) / (samples - 1) as f64;
    let ts: Vec<f64> = (0..samples)
        .map(|i| if i + 1 == samples { range.end } else { range.start + step * i as f64 })
        .collect();
    let points = primitive.sample_all(&ts);

    (ts, points, step)
}

fn refine(
    a: &Primitive,
    b: &Primitive,
    range_a: Range<f64>,
    range_b: Range<f64>,
    depth: u32,
    options: &IntersectionOptions,
    output: &mut Vec<(f64, f64)>,
) {
    let samples = options.samples.max(2);
    let (ts_a, points_a, step_a) = sample_range(a, &range_a, samples);
    let (ts_b, points_b, step_b) = sample_range(b, &range_b, samples);

    for (i, j, s, u) in polyline_intersections(&points_a, &points_b) {
        let t_a = ts_a[i] + (ts_a[i + 1] - ts_a[i]) * s;
        let t_b = ts_b[j] + (ts_b[j + 1] - ts_b[j]) * u;

        if step_a < options.min_step || step_b < options.min_step {
            log::trace!("intersection refinement reached the minimum step at depth {depth}");
            output.push((t_a, t_b));
            continue;
        }

        if depth >= options.enhancements {
            output.push((t_a, t_b));
            continue;
        }

        // Zoom into the bracketing samples, widened by one step on each side.
        let sub_a = (ts_a[i] - step_a).max(0.0)..(ts_a[i + 1] + step_a).min(1.0);
        let sub_b = (ts_b[j] - step_b).max(0.0)..(ts_b[j + 1] + step_b).min(1.0);

        let found = output.len();
        refine(a, b, sub_a, sub_b, depth + 1, options, output);
        if output.len() == found {
            output.push((t_a, t_b));
        }
    }
}

fn dedup_intersections(intersections: &mut Vec<(f64, f64)>, tolerance: f64) {
    intersections.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    let mut kept: Vec<(f64, f64)> = Vec::with_capacity(intersections.len());
    for &(t_a, t_b) in intersections.iter() {
        let duplicate = kept
            .iter()
            .any(|&(ka, kb)| (ka - t_a).abs() <= tolerance && (kb - t_b).abs() <= tolerance);
        if !duplicate {
            kept.push((t_a, t_b));
        }
    }
    *intersections = kept;
}

#[cfg(test)]
use crate::{math::point, math::Vector, Arc, CubicBezierSegment, QuadraticBezierSegment};

#[cfg(test)]
fn assert_same_point(a: Point, b: Point, epsilon: f64) {
    let d: Vector = a - b;
    assert!(d.length() <= epsilon, "{:?} != {:?}", a, b);
}

#[test]
fn line_line() {
    let a = Primitive::Line(LineSegment::new(point(0.0, 0.0), point(100.0, 100.0)));
    let b = Primitive::Line(LineSegment::new(point(100.0, 0.0), point(0.0, 100.0)));

    assert_eq!(intersections(&a, &b, &IntersectionOptions::DEFAULT), vec![(0.5, 0.5)]);
}

#[test]
fn line_quadratic() {
    let line = LineSegment::new(point(0.0, 5.0), point(10.0, 5.0));
    let curve = Primitive::Quadratic(QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(5.0, 20.0),
        to: point(10.0, 0.0),
    });

    let result = intersections(&Primitive::Line(line), &curve, &IntersectionOptions::DEFAULT);
    assert_eq!(result.len(), 2);
    let expected = 0.5 - 800.0f64.sqrt() / 80.0;
    assert!((result[0].0 - expected).abs() < 1e-12);
    assert!((result[0].1 - expected).abs() < 1e-12);
    for (t_line, t_curve) in result {
        assert_same_point(line.sample(t_line), curve.sample(t_curve), 1e-9);
    }

    // Same crossings with the arguments swapped.
    let swapped = intersections(&curve, &Primitive::Line(line), &IntersectionOptions::DEFAULT);
    assert_eq!(swapped.len(), 2);
    for (t_curve, t_line) in swapped {
        assert_same_point(line.sample(t_line), curve.sample(t_curve), 1e-9);
    }
}

#[test]
fn line_cubic() {
    let line = LineSegment::new(point(0.0, 10.0), point(100.0, -10.0));
    let curve = Primitive::Cubic(CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(30.0, 80.0),
        ctrl2: point(70.0, -80.0),
        to: point(100.0, 0.0),
    });

    let result = intersections(&Primitive::Line(line), &curve, &IntersectionOptions::DEFAULT);
    assert_eq!(result.len(), 3);
    for (t_line, t_curve) in result {
        assert_same_point(line.sample(t_line), curve.sample(t_curve), 1e-9);
    }
}

#[test]
fn line_misses_curve_span() {
    // The supporting line crosses the curve but the segment stops short of it.
    let line = LineSegment::new(point(0.0, 5.0), point(1.0, 5.0));
    let curve = Primitive::Quadratic(QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(5.0, 20.0),
        to: point(10.0, 0.0),
    });

    assert!(intersections(&Primitive::Line(line), &curve, &IntersectionOptions::DEFAULT).is_empty());
}

#[test]
fn disjoint_bounding_boxes() {
    let a = Primitive::Cubic(CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 1.0),
        ctrl2: point(2.0, 1.0),
        to: point(3.0, 0.0),
    });
    let b = a.transformed(&crate::math::Transform::translation(10.0, 0.0));

    assert!(intersections(&a, &b, &IntersectionOptions::DEFAULT).is_empty());
}

#[test]
fn arc_arc() {
    let a = Primitive::Arc(Arc::new(point(-10.0, 0.0), point(0.0, 10.0), point(10.0, 0.0)));
    let b = Primitive::Arc(Arc::new(point(0.0, 0.0), point(10.0, 10.0), point(20.0, 0.0)));

    let result = intersections(&a, &b, &IntersectionOptions::DEFAULT);
    assert_eq!(result.len(), 1);
    let (t_a, t_b) = result[0];
    let expected = point(5.0, 75.0f64.sqrt());
    assert_same_point(a.sample(t_a), expected, 1e-6);
    assert_same_point(b.sample(t_b), expected, 1e-6);
}

#[test]
fn quadratic_cubic() {
    let a = Primitive::Quadratic(QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(50.0, 100.0),
        to: point(100.0, 0.0),
    });
    let b = Primitive::Cubic(CubicBezierSegment {
        from: point(0.0, 60.0),
        ctrl1: point(30.0, -20.0),
        ctrl2: point(70.0, -20.0),
        to: point(100.0, 60.0),
    });

    let result = intersections(&a, &b, &IntersectionOptions::DEFAULT);
    assert_eq!(result.len(), 2);
    for (t_a, t_b) in result {
        assert_same_point(a.sample(t_a), b.sample(t_b), 1e-6);
    }
}

#[test]
fn coarse_estimate_without_refinement() {
    let a = Primitive::Arc(Arc::new(point(-10.0, 0.0), point(0.0, 10.0), point(10.0, 0.0)));
    let b = Primitive::Arc(Arc::new(point(0.0, 0.0), point(10.0, 10.0), point(20.0, 0.0)));

    let options = IntersectionOptions::DEFAULT.with_enhancements(0);
    let result = intersections(&a, &b, &options);
    assert_eq!(result.len(), 1);
    let (t_a, t_b) = result[0];
    assert_same_point(a.sample(t_a), b.sample(t_b), 0.1);

    // A minimum step larger than the sampling step stops right away as well.
    let options = IntersectionOptions::DEFAULT.with_min_step(0.5);
    assert_eq!(intersections(&a, &b, &options).len(), 1);
}

#[test]
fn points_never_intersect() {
    let p = Primitive::Point(point(5.0, 5.0));
    let l = Primitive::Line(LineSegment::new(point(0.0, 0.0), point(10.0, 10.0)));
    assert!(intersections(&p, &l, &IntersectionOptions::DEFAULT).is_empty());
}
