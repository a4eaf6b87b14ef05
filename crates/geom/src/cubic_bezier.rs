//! Cubic bézier segments.

use crate::error::DomainError;
use crate::math::{Box2D, Point, Transform, Vector};
use crate::primitive::Evaluate;
use crate::utils::{polynomial_curvature, polynomial_tangent, quadratic_polynomial_roots};

#[cfg(test)]
use crate::quadratic_bezier::QuadraticBezierSegment;

/// Number of samples of the polyline used when the quadrature does not produce a
/// usable length.
const POLYLINE_LENGTH_SAMPLES: u32 = 50;

/// Abscissae (positive half) and weights of the 24 points Gauss-Legendre rule over
/// `[-1, 1]`.
const GAUSS_LEGENDRE_24: [(f64, f64); 12] = [
    (0.06405689286260563, 0.12793819534675216),
    (0.19111886747361631, 0.12583745634682830),
    (0.31504267969616337, 0.12167047292780339),
    (0.43379350762604514, 0.11550566805372560),
    (0.54542147138883954, 0.10744427011596563),
    (0.64809365193697557, 0.09761865210411389),
    (0.74012419157855436, 0.08619016153195328),
    (0.82000198597390292, 0.07334648141108031),
    (0.88641552700440103, 0.05929858491543678),
    (0.93827455200273276, 0.04427743881741981),
    (0.97472855597130950, 0.02853138862893366),
    (0.99518721999702136, 0.01234122979998720),
];

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f64) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from * one_t3
            + self.ctrl1.to_vector() * 3.0 * one_t2 * t
            + self.ctrl2.to_vector() * 3.0 * one_t * t2
            + self.to.to_vector() * t3
    }

    /// Sample the x coordinate of the curve at t (expecting t between 0 and 1).
    pub fn x(&self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from.x * one_t3
            + self.ctrl1.x * 3.0 * one_t2 * t
            + self.ctrl2.x * 3.0 * one_t * t2
            + self.to.x * t3
    }

    /// Sample the y coordinate of the curve at t (expecting t between 0 and 1).
    pub fn y(&self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from.y * one_t3
            + self.ctrl1.y * 3.0 * one_t2 * t
            + self.ctrl2.y * 3.0 * one_t * t2
            + self.to.y * t3
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: f64) -> Vector {
        let t2 = t * t;
        self.from.to_vector() * (-3.0 * t2 + 6.0 * t - 3.0)
            + self.ctrl1.to_vector() * (9.0 * t2 - 12.0 * t + 3.0)
            + self.ctrl2.to_vector() * (-9.0 * t2 + 6.0 * t)
            + self.to.to_vector() * (3.0 * t2)
    }

    /// Sample the curve's second derivative at t.
    pub fn second_derivative(&self, t: f64) -> Vector {
        let a = self.ctrl2.to_vector() - self.ctrl1.to_vector() * 2.0 + self.from.to_vector();
        let b = self.to.to_vector() - self.ctrl2.to_vector() * 2.0 + self.ctrl1.to_vector();
        (a * (1.0 - t) + b * t) * 6.0
    }

    /// The third derivative, constant over the whole curve.
    pub fn third_derivative(&self) -> Vector {
        (self.to.to_vector() - self.ctrl2.to_vector() * 3.0 + self.ctrl1.to_vector() * 3.0
            - self.from.to_vector())
            * 6.0
    }

    /// Power basis coefficients: `P(t) = c0 + c1 t + c2 t² + c3 t³`.
    pub fn polynomial_coefficients(&self) -> [Vector; 4] {
        let p0 = self.from.to_vector();
        let p1 = self.ctrl1.to_vector();
        let p2 = self.ctrl2.to_vector();
        let p3 = self.to.to_vector();
        [
            p0,
            (p1 - p0) * 3.0,
            (p0 - p1 * 2.0 + p2) * 3.0,
            p3 - p0 + (p1 - p2) * 3.0,
        ]
    }

    /// Applies the transform to this curve and returns the results.
    #[inline]
    pub fn transformed(&self, transform: &Transform) -> Self {
        CubicBezierSegment {
            from: transform.transform_point(self.from),
            ctrl1: transform.transform_point(self.ctrl1),
            ctrl2: transform.transform_point(self.ctrl2),
            to: transform.transform_point(self.to),
        }
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        CubicBezierSegment {
            from: self.to,
            ctrl1: self.ctrl2,
            ctrl2: self.ctrl1,
            to: self.from,
        }
    }

    /// Invokes a callback at each local extremum of the x coordinate, in increasing t
    /// order and strictly inside `(0, 1)`.
    pub fn for_each_local_x_extremum_t<F>(&self, cb: &mut F)
    where
        F: FnMut(f64),
    {
        Self::for_each_local_extremum(self.from.x, self.ctrl1.x, self.ctrl2.x, self.to.x, cb)
    }

    /// Invokes a callback at each local extremum of the y coordinate, in increasing t
    /// order and strictly inside `(0, 1)`.
    pub fn for_each_local_y_extremum_t<F>(&self, cb: &mut F)
    where
        F: FnMut(f64),
    {
        Self::for_each_local_extremum(self.from.y, self.ctrl1.y, self.ctrl2.y, self.to.y, cb)
    }

    fn for_each_local_extremum<F>(p0: f64, p1: f64, p2: f64, p3: f64, cb: &mut F)
    where
        F: FnMut(f64),
    {
        // The derivative of a cubic bézier curve is a second degree polynomial.
        let a = 3.0 * (p3 + 3.0 * (p1 - p2) - p0);
        let b = 6.0 * (p2 - 2.0 * p1 + p0);
        let c = 3.0 * (p1 - p0);

        for t in quadratic_polynomial_roots(a, b, c) {
            if t > 0.0 && t < 1.0 {
                cb(t);
            }
        }
    }

    /// Returns the smallest rectangle the curve is contained in.
    ///
    /// Only the end points and the roots of the derivative are evaluated.
    pub fn bounding_box(&self) -> Box2D {
        let mut min = self.from.min(self.to);
        let mut max = self.from.max(self.to);

        self.for_each_local_x_extremum_t(&mut |t| {
            let x = self.x(t);
            min.x = min.x.min(x);
            max.x = max.x.max(x);
        });
        self.for_each_local_y_extremum_t(&mut |t| {
            let y = self.y(t);
            min.y = min.y.min(y);
            max.y = max.y.max(y);
        });

        Box2D { min, max }
    }

    /// Computes the length of this segment.
    ///
    /// Integrates the speed with a 24 points Gauss-Legendre quadrature and falls back
    /// to the length of a polyline approximation if that does not produce a finite
    /// value.
    pub fn length(&self) -> f64 {
        let mut sum = 0.0;
        for &(x, w) in &GAUSS_LEGENDRE_24 {
            sum += w * self.derivative(0.5 - 0.5 * x).length();
            sum += w * self.derivative(0.5 + 0.5 * x).length();
        }
        let length = 0.5 * sum;

        if length.is_finite() {
            return length;
        }

        self.polyline_length(POLYLINE_LENGTH_SAMPLES)
    }

    /// Length of the polyline joining `samples + 1` evenly spaced points of the curve.
    pub fn polyline_length(&self, samples: u32) -> f64 {
        let samples = samples.max(1);
        let mut length = 0.0;
        let mut prev = self.from;
        for i in 1..=samples {
            let p = self.sample(i as f64 / samples as f64);
            length += (p - prev).length();
            prev = p;
        }

        length
    }
}

impl Evaluate for CubicBezierSegment {
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
        match n {
            0 => self.sample(t).to_vector(),
            1 => self.derivative(t),
            2 => self.second_derivative(t),
            3 => self.third_derivative(),
            _ => Vector::zero(),
        }
    }

    fn curvature(&self, t: f64) -> Result<f64, DomainError> {
        polynomial_curvature(&self.polynomial_coefficients(), t)
    }

    fn tangent(&self, t: f64) -> Result<Vector, DomainError> {
        polynomial_tangent(&self.polynomial_coefficients(), t)
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
use crate::math::point;

#[test]
fn bounding_box_for_cubic_bezier_segment() {
    let a = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.5, 1.0),
        ctrl2: point(1.5, -1.0),
        to: point(2.0, 0.0),
    };

    let expected_bigger_bounding_box = Box2D {
        min: point(0.0, -0.6),
        max: point(2.0, 0.6),
    };
    let expected_smaller_bounding_box = Box2D {
        min: point(0.1, -0.5),
        max: point(2.0, 0.5),
    };

    let actual_bounding_box = a.bounding_box();

    assert!(expected_bigger_bounding_box.contains_box(&actual_bounding_box));
    assert!(actual_bounding_box.contains_box(&expected_smaller_bounding_box));
}

#[test]
fn length_straight_line() {
    let len = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 0.0),
        ctrl2: point(1.0, 0.0),
        to: point(2.0, 0.0),
    }
    .length();
    assert!((len - 2.0).abs() < 0.000001);
}

#[test]
fn length_matches_a_fine_polyline() {
    let c = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(30.0, 80.0),
        ctrl2: point(70.0, -80.0),
        to: point(100.0, 0.0),
    };
    let reference = c.polyline_length(100_000);
    assert!((c.length() - reference).abs() < 1e-3);
    // The coarse polyline is a lower bound.
    assert!(c.polyline_length(50) <= c.length());
}

#[test]
fn derivatives_match_the_power_basis() {
    use euclid::approxeq::ApproxEq;

    let c = CubicBezierSegment {
        from: point(1.0, 2.0),
        ctrl1: point(4.0, 9.0),
        ctrl2: point(-3.0, 5.0),
        to: point(8.0, 0.0),
    };
    let [_, c1, c2, c3] = c.polynomial_coefficients();
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        let d1 = c1 + c2 * 2.0 * t + c3 * 3.0 * t * t;
        let d2 = c2 * 2.0 + c3 * 6.0 * t;
        assert!(c.derivative(t).approx_eq_eps(&d1, &Vector::new(1e-9, 1e-9)));
        assert!(c
            .second_derivative(t)
            .approx_eq_eps(&d2, &Vector::new(1e-9, 1e-9)));
    }
    assert!(c
        .third_derivative()
        .approx_eq_eps(&(c3 * 6.0), &Vector::new(1e-9, 1e-9)));
}

#[test]
fn curvature_at_a_cusp_is_undefined() {
    let c = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 1.0),
        ctrl2: point(0.0, 1.0),
        to: point(1.0, 0.0),
    };
    assert_eq!(
        Evaluate::curvature(&c, 0.5),
        Err(DomainError::UndefinedCurvature { t: 0.5 })
    );
    // The curve leaves the cusp along the second derivative.
    assert_eq!(Evaluate::tangent(&c, 0.5), Ok(Vector::new(0.0, -1.0)));
}

#[test]
fn curvature_of_an_elevated_quadratic() {
    let q = QuadraticBezierSegment {
        from: point(-1.0, 1.0),
        ctrl: point(0.0, -1.0),
        to: point(1.0, 1.0),
    };
    let c = CubicBezierSegment {
        from: q.from,
        ctrl1: q.from.lerp(q.ctrl, 2.0 / 3.0),
        ctrl2: q.to.lerp(q.ctrl, 2.0 / 3.0),
        to: q.to,
    };
    for i in 0..=4 {
        let t = i as f64 / 4.0;
        let expected = Evaluate::curvature(&q, t).unwrap();
        assert!((Evaluate::curvature(&c, t).unwrap() - expected).abs() < 1e-9);
    }
}

