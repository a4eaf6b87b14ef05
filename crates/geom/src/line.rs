use crate::error::DomainError;
use crate::math::{point, Box2D, Point, Transform, Vector};
use crate::primitive::Evaluate;
use crate::utils::min_max;

/// Relative threshold under which two segments are considered parallel.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

impl LineSegment {
    #[inline]
    pub fn new(from: Point, to: Point) -> Self {
        LineSegment { from, to }
    }

    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: f64) -> Point {
        self.from.lerp(self.to, t)
    }

    #[inline]
    pub fn to_vector(&self) -> Vector {
        self.to - self.from
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.to_vector().length()
    }

    #[inline]
    pub fn square_length(&self) -> f64 {
        self.to_vector().square_length()
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    /// Return the smallest rectangle containing this segment.
    #[inline]
    pub fn bounding_box(&self) -> Box2D {
        let (min_x, max_x) = min_max(self.from.x, self.to.x);
        let (min_y, max_y) = min_max(self.from.y, self.to.y);
        Box2D {
            min: point(min_x, min_y),
            max: point(max_x, max_y),
        }
    }

    /// Applies the transform to this segment and returns the results.
    #[inline]
    pub fn transformed(&self, transform: &Transform) -> Self {
        LineSegment {
            from: transform.transform_point(self.from),
            to: transform.transform_point(self.to),
        }
    }

    /// Power basis coefficients: `P(t) = c0 + c1 t`.
    pub fn polynomial_coefficients(&self) -> [Vector; 2] {
        [self.from.to_vector(), self.to_vector()]
    }

    /// The rigid transform that moves `from` to the origin and `to` onto the positive
    /// x axis.
    pub fn to_x_axis(&self) -> Transform {
        let v = self.to_vector();
        Transform::translation(-self.from.x, -self.from.y).then_rotate(-v.angle_from_x_axis())
    }

    /// Computes the intersection (if any) between this segment and another one.
    ///
    /// The result is provided in the form of the `t` parameter of each
    /// segment. Both parameters are in `[0, 1]`, end points included. Parallel and
    /// collinear segments never intersect.
    pub fn intersection_t(&self, other: &Self) -> Option<(f64, f64)> {
        let v1 = self.to_vector();
        let v2 = other.to_vector();

        let v1_cross_v2 = v1.cross(v2);

        if v1_cross_v2.abs() <= PARALLEL_TOLERANCE * v1.length() * v2.length() {
            return None;
        }

        let sign_v1_cross_v2 = v1_cross_v2.signum();
        let abs_v1_cross_v2 = v1_cross_v2.abs();

        let v3 = other.from - self.from;

        // t and u should be divided by v1_cross_v2, but we postpone that to not lose
        // precision.
        let t = v3.cross(v2) * sign_v1_cross_v2;
        let u = v3.cross(v1) * sign_v1_cross_v2;

        if t < 0.0 || t > abs_v1_cross_v2 || u < 0.0 || u > abs_v1_cross_v2 {
            return None;
        }

        Some((t / abs_v1_cross_v2, u / abs_v1_cross_v2))
    }
}

impl Evaluate for LineSegment {
    fn from(&self) -> Point {
        self.from
    }

    fn to(&self) -> Point {
        self.to
    }

    fn sample(&self, t: f64) -> Point {
        self.sample(t)
    }

    fn derivative(&self, _t: f64, n: u32) -> Vector {
        match n {
            0 => self.from.to_vector(),
            1 => self.to_vector(),
            _ => Vector::zero(),
        }
    }

    fn curvature(&self, t: f64) -> Result<f64, DomainError> {
        if self.from == self.to {
            return Err(DomainError::UndefinedCurvature { t });
        }
        Ok(0.0)
    }

    fn tangent(&self, t: f64) -> Result<Vector, DomainError> {
        if self.from == self.to {
            return Err(DomainError::UndefinedTangent { t });
        }
        Ok(self.to_vector().normalize())
    }

    fn length(&self) -> f64 {
        self.length()
    }

    fn bounding_box(&self) -> Box2D {
        self.bounding_box()
    }

    fn reversed(&self) -> Self {
        self.flip()
    }

    fn transformed(&self, transform: &Transform) -> Self {
        self.transformed(transform)
    }
}

#[test]
fn intersection_crossing() {
    let l1 = LineSegment::new(point(0.0, 0.0), point(100.0, 100.0));
    let l2 = LineSegment::new(point(100.0, 0.0), point(0.0, 100.0));

    assert_eq!(l1.intersection_t(&l2), Some((0.5, 0.5)));
    assert_eq!(l1.sample(0.5), point(50.0, 50.0));
}

#[test]
fn intersection_rotated() {
    use core::f64::consts::PI;
    let epsilon = 1e-9;
    let count: u32 = 100;

    for i in 0..count {
        for j in 0..count {
            if i % (count / 2) == j % (count / 2) {
                // avoid the colinear case.
                continue;
            }

            let angle1 = i as f64 / (count as f64) * 2.0 * PI;
            let angle2 = j as f64 / (count as f64) * 2.0 * PI;

            let l1 = LineSegment::new(
                point(10.0 * angle1.cos(), 10.0 * angle1.sin()),
                point(-10.0 * angle1.cos(), -10.0 * angle1.sin()),
            );
            let l2 = LineSegment::new(
                point(10.0 * angle2.cos(), 10.0 * angle2.sin()),
                point(-10.0 * angle2.cos(), -10.0 * angle2.sin()),
            );

            let (t, u) = l1.intersection_t(&l2).unwrap();
            assert!((t - 0.5).abs() < epsilon);
            assert!((u - 0.5).abs() < epsilon);
        }
    }
}

#[test]
fn intersection_at_end_points() {
    let l1 = LineSegment::new(point(0.0, 0.0), point(10.0, 10.0));
    let l2 = LineSegment::new(point(10.0, 10.0), point(10.0, 0.0));

    assert_eq!(l1.intersection_t(&l2), Some((1.0, 0.0)));
}

#[test]
fn intersection_parallel() {
    let l1 = LineSegment::new(point(0.0, 0.0), point(10.0, 0.0));
    let l2 = LineSegment::new(point(5.0, 0.0), point(15.0, 0.0));
    let l3 = LineSegment::new(point(0.0, 1.0), point(10.0, 1.0));

    assert!(l1.intersection_t(&l2).is_none());
    assert!(l1.intersection_t(&l3).is_none());
}

#[test]
fn bounding_box() {
    let l1 = LineSegment::new(point(1.0, 5.0), point(5.0, 7.0));
    let r1 = Box2D {
        min: point(1.0, 5.0),
        max: point(5.0, 7.0),
    };

    let l2 = LineSegment::new(point(5.0, 5.0), point(1.0, 1.0));
    let r2 = Box2D {
        min: point(1.0, 1.0),
        max: point(5.0, 5.0),
    };

    assert_eq!(l1.bounding_box(), r1);
    assert_eq!(l2.bounding_box(), r2);
}

#[test]
fn x_axis_alignment() {
    use euclid::approxeq::ApproxEq;

    let l = LineSegment::new(point(2.0, 3.0), point(5.0, 7.0));
    let m = l.to_x_axis();
    assert!(m.transform_point(l.from).approx_eq(&point(0.0, 0.0)));
    assert!(m.transform_point(l.to).approx_eq(&point(5.0, 0.0)));
}
