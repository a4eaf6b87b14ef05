//! Circular arcs described by three points.

use crate::error::DomainError;
use crate::line::LineSegment;
use crate::math::{point, vector, Angle, Box2D, Point, Transform, Vector};
use crate::primitive::Evaluate;

use core::f64::consts::{FRAC_PI_2, TAU};

/// Relative threshold under which three points are considered collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// A circular arc going from `from` to `to` and passing through `ctrl`.
///
/// When `from == to` the arc is a full circle whose diameter is the segment between
/// `from` and `ctrl`. It then sweeps in the direction of increasing angles (clockwise
/// on a y-down canvas).
///
/// When the three points are collinear there is no circle through them and the arc
/// behaves like the straight segment from `from` to `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Arc {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
}

/// The center parameterization of an [`Arc`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CircularArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: Angle,
    pub sweep_angle: Angle,
}

impl CircularArc {
    /// Sample the curve's angle at t (expecting t between 0 and 1).
    #[inline]
    pub fn get_angle(&self, t: f64) -> Angle {
        self.start_angle + Angle::radians(self.sweep_angle.get() * t)
    }

    #[inline]
    pub fn end_angle(&self) -> Angle {
        self.start_angle + self.sweep_angle
    }

    #[inline]
    pub fn sample(&self, t: f64) -> Point {
        let (sin, cos) = self.get_angle(t).sin_cos();
        self.center + vector(cos, sin) * self.radius
    }

    /// The n-th derivative with respect to t.
    ///
    /// Each derivation multiplies by the angular rate and rotates by a quarter turn.
    pub fn derivative(&self, t: f64, n: u32) -> Vector {
        if n == 0 {
            return self.sample(t).to_vector();
        }
        let angle = self.get_angle(t).get() + n as f64 * FRAC_PI_2;
        let scale = self.radius * self.sweep_angle.get().powi(n as i32);
        vector(angle.cos(), angle.sin()) * scale
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep_angle.get().abs()
    }

    /// Returns whether the arc passes through the given angle.
    pub fn contains_angle(&self, angle: Angle) -> bool {
        let sweep = self.sweep_angle.get();
        let delta = if sweep >= 0.0 {
            (angle.get() - self.start_angle.get()).rem_euclid(TAU)
        } else {
            (self.start_angle.get() - angle.get()).rem_euclid(TAU)
        };

        delta <= sweep.abs()
    }

    /// Returns the smallest rectangle containing the arc.
    ///
    /// The end points are extended by whichever of the four axis-aligned extrema of the
    /// circle the arc sweeps over.
    pub fn bounding_box(&self) -> Box2D {
        let from = self.sample(0.0);
        let to = self.sample(1.0);
        let mut min = from.min(to);
        let mut max = from.max(to);

        for quadrant in 0..4 {
            let angle = Angle::radians(quadrant as f64 * FRAC_PI_2);
            if self.contains_angle(angle) {
                let (sin, cos) = angle.sin_cos();
                let p = self.center + vector(cos, sin) * self.radius;
                min = min.min(p);
                max = max.max(p);
            }
        }

        Box2D { min, max }
    }
}

impl Arc {
    #[inline]
    pub fn new(from: Point, ctrl: Point, to: Point) -> Self {
        Arc { from, ctrl, to }
    }

    /// Returns true if the arc describes a full circle.
    #[inline]
    pub fn is_full_circle(&self) -> bool {
        self.from == self.to && self.from != self.ctrl
    }

    /// The center of the circle going through the three points.
    ///
    /// Computed as the intersection of the perpendicular bisectors of `from -> ctrl` and
    /// `ctrl -> to`. Returns `None` if the points are collinear.
    pub fn center(&self) -> Option<Point> {
        if self.is_full_circle() {
            return Some(self.from.lerp(self.ctrl, 0.5));
        }
        if self.from == self.to {
            return None;
        }

        let ab = self.ctrl - self.from;
        let bc = self.to - self.ctrl;
        let denominator = ab.cross(bc);
        if denominator.abs() <= COLLINEAR_TOLERANCE * ab.length() * bc.length() {
            return None;
        }

        let m1 = self.from.lerp(self.ctrl, 0.5);
        let m2 = self.ctrl.lerp(self.to, 0.5);
        let d1 = vector(-ab.y, ab.x);
        let d2 = vector(-bc.y, bc.x);
        let s = (m2 - m1).cross(d2) / d1.cross(d2);

        Some(m1 + d1 * s)
    }

    /// The radius of the circle going through the three points, if any.
    pub fn radius(&self) -> Option<f64> {
        self.center().map(|center| (self.from - center).length())
    }

    /// The center parameterization of this arc, or `None` if the points are collinear.
    pub fn to_circular(&self) -> Option<CircularArc> {
        let center = self.center()?;
        let radius = (self.from - center).length();
        let start = (self.from - center).angle_from_x_axis();

        let sweep = if self.is_full_circle() {
            TAU
        } else {
            let end = (self.to - center).angle_from_x_axis();
            let through = (self.ctrl - center).angle_from_x_axis();
            let ccw = (end.get() - start.get()).rem_euclid(TAU);
            let offset = (through.get() - start.get()).rem_euclid(TAU);
            if offset <= ccw {
                ccw
            } else {
                ccw - TAU
            }
        };

        Some(CircularArc {
            center,
            radius,
            start_angle: start,
            sweep_angle: Angle::radians(sweep),
        })
    }

    /// The straight segment used when the points are collinear.
    #[inline]
    pub fn chord(&self) -> LineSegment {
        LineSegment::new(self.from, self.to)
    }

    pub fn sample(&self, t: f64) -> Point {
        match self.to_circular() {
            Some(arc) => arc.sample(t),
            None => self.chord().sample(t),
        }
    }

    pub fn length(&self) -> f64 {
        match self.to_circular() {
            Some(arc) => arc.length(),
            None => self.chord().length(),
        }
    }

    pub fn bounding_box(&self) -> Box2D {
        match self.to_circular() {
            Some(arc) => arc.bounding_box(),
            None => self.chord().bounding_box(),
        }
    }

    /// Swap the beginning and the end of the arc.
    ///
    /// A full circle keeps its orientation.
    #[inline]
    pub fn flip(&self) -> Self {
        Arc {
            from: self.to,
            ctrl: self.ctrl,
            to: self.from,
        }
    }

    /// Applies the transform to the three defining points.
    ///
    /// The result is the image of the arc for similarity transforms (translations,
    /// rotations and uniform scales).
    pub fn transformed(&self, transform: &Transform) -> Self {
        Arc {
            from: transform.transform_point(self.from),
            ctrl: transform.transform_point(self.ctrl),
            to: transform.transform_point(self.to),
        }
    }
}

impl Evaluate for Arc {
    fn from(&self) -> Point {
        self.from
    }

    fn to(&self) -> Point {
        self.to
    }

    fn sample(&self, t: f64) -> Point {
        self.sample(t)
    }

    fn derivative(&self, t: f64, n: u32) -> Vector {
        match self.to_circular() {
            Some(arc) => arc.derivative(t, n),
            None => Evaluate::derivative(&self.chord(), t, n),
        }
    }

    fn curvature(&self, t: f64) -> Result<f64, DomainError> {
        match self.to_circular() {
            Some(arc) if arc.radius > 0.0 => Ok(1.0 / arc.radius),
            Some(_) => Err(DomainError::UndefinedCurvature { t }),
            None => Evaluate::curvature(&self.chord(), t),
        }
    }

    fn tangent(&self, t: f64) -> Result<Vector, DomainError> {
        match self.to_circular() {
            Some(arc) if arc.length() > 0.0 => Ok(arc.derivative(t, 1).normalize()),
            Some(_) => Err(DomainError::UndefinedTangent { t }),
            None => Evaluate::tangent(&self.chord(), t),
        }
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

#[cfg(test)]
use euclid::approxeq::ApproxEq;

#[cfg(test)]
fn assert_near(a: Point, b: Point) {
    assert!(
        a.approx_eq_eps(&b, &point(1e-9, 1e-9)),
        "{:?} != {:?}",
        a,
        b
    );
}

#[test]
fn quarter_circle() {
    let h = core::f64::consts::FRAC_1_SQRT_2;
    let arc = Arc::new(point(1.0, 0.0), point(h, h), point(0.0, 1.0));

    assert_near(arc.center().unwrap(), point(0.0, 0.0));
    assert!((arc.radius().unwrap() - 1.0).abs() < 1e-12);
    assert!((arc.length() - FRAC_PI_2).abs() < 1e-12);
    assert_near(arc.sample(0.0), arc.from);
    assert_near(arc.sample(0.5), point(h, h));
    assert_near(arc.sample(1.0), arc.to);

    let bb = arc.bounding_box();
    assert_near(bb.min, point(0.0, 0.0));
    assert_near(bb.max, point(1.0, 1.0));
}

#[test]
fn arc_follows_the_control_point() {
    // Same end points as a quarter circle, but going the long way through (0, -1).
    let arc = Arc::new(point(1.0, 0.0), point(0.0, -1.0), point(0.0, 1.0));
    let circular = arc.to_circular().unwrap();

    assert!((circular.sweep_angle.get() + 1.5 * core::f64::consts::PI).abs() < 1e-12);
    assert!((arc.length() - 1.5 * core::f64::consts::PI).abs() < 1e-12);
    assert_near(arc.sample(1.0 / 3.0), point(0.0, -1.0));

    let bb = arc.bounding_box();
    assert_near(bb.min, point(-1.0, -1.0));
    assert_near(bb.max, point(1.0, 1.0));
}

#[test]
fn full_circle() {
    let arc = Arc::new(point(0.0, 0.0), point(2.0, 0.0), point(0.0, 0.0));

    assert!(arc.is_full_circle());
    assert_near(arc.center().unwrap(), point(1.0, 0.0));
    assert!((arc.length() - TAU).abs() < 1e-12);
    assert_near(arc.sample(0.5), point(2.0, 0.0));
    // Starting at angle pi, a quarter turn toward increasing angles reaches (1, -1).
    assert_near(arc.sample(0.25), point(1.0, -1.0));

    let bb = arc.bounding_box();
    assert_near(bb.min, point(0.0, -1.0));
    assert_near(bb.max, point(2.0, 1.0));
}

#[test]
fn collinear_points_fall_back_to_the_chord() {
    let arc = Arc::new(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0));

    assert!(arc.center().is_none());
    assert_near(arc.sample(0.5), point(1.0, 1.0));
    assert!((arc.length() - 8.0f64.sqrt()).abs() < 1e-12);
    assert_eq!(Evaluate::curvature(&arc, 0.5), Ok(0.0));
}

#[test]
fn derivatives_and_curvature() {
    let arc = Arc::new(point(10.0, 0.0), point(0.0, 10.0), point(-10.0, 0.0));
    assert_eq!(Evaluate::curvature(&arc, 0.3), Ok(0.1));

    let eps = 1e-6;
    for i in 1..10 {
        let t = i as f64 / 10.0;
        let d1 = Evaluate::derivative(&arc, t, 1);
        let fd = (arc.sample(t + eps) - arc.sample(t - eps)) / (2.0 * eps);
        assert!(d1.approx_eq_eps(&fd, &vector(1e-4, 1e-4)));

        let d2 = Evaluate::derivative(&arc, t, 2);
        let fd2 = (Evaluate::derivative(&arc, t + eps, 1) - Evaluate::derivative(&arc, t - eps, 1))
            / (2.0 * eps);
        assert!(d2.approx_eq_eps(&fd2, &vector(1e-3, 1e-3)));
    }
}

#[test]
fn center_matches_the_circumcenter() {
    use rand::{Rng, SeedableRng};

    // Circumcenter from the determinant formula.
    fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < 1e-3 {
            return None;
        }
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        Some(point(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        ))
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    let mut checked = 0;
    for _ in 0..1000 {
        let mut p = || point(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let arc = Arc::new(p(), p(), p());
        let expected = match circumcenter(arc.from, arc.ctrl, arc.to) {
            Some(c) => c,
            None => continue,
        };
        let center = arc.center().unwrap();
        let tolerance = 1e-6 * (1.0 + expected.to_vector().length());
        assert!((center - expected).length() < tolerance);

        let expected_radius = (arc.from - expected).length();
        assert!((arc.radius().unwrap() - expected_radius).abs() < tolerance);
        assert!(((arc.to - center).length() - expected_radius).abs() < tolerance);
        checked += 1;
    }
    assert!(checked > 900);
}
