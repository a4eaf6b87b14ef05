//! Quadratic bézier segments.

use crate::error::DomainError;
use crate::math::{point, Box2D, Point, Transform, Vector};
use crate::primitive::Evaluate;
use crate::utils::{polynomial_curvature, polynomial_tangent};

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
}

impl QuadraticBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f64) -> Point {
        let t2 = t * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * 2.0 * one_t * t + self.to.to_vector() * t2
    }

    /// Sample the x coordinate of the curve at t (expecting t between 0 and 1).
    pub fn x(&self, t: f64) -> f64 {
        let t2 = t * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;

        self.from.x * one_t2 + self.ctrl.x * 2.0 * one_t * t + self.to.x * t2
    }

    /// Sample the y coordinate of the curve at t (expecting t between 0 and 1).
    pub fn y(&self, t: f64) -> f64 {
        let t2 = t * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;

        self.from.y * one_t2 + self.ctrl.y * 2.0 * one_t * t + self.to.y * t2
    }

    /// Sample the curve's first derivative at t.
    pub fn derivative(&self, t: f64) -> Vector {
        (self.ctrl - self.from) * 2.0 * (1.0 - t) + (self.to - self.ctrl) * 2.0 * t
    }

    /// The second derivative, constant over the whole curve.
    pub fn second_derivative(&self) -> Vector {
        (self.from.to_vector() - self.ctrl.to_vector() * 2.0 + self.to.to_vector()) * 2.0
    }

    /// Power basis coefficients: `P(t) = c0 + c1 t + c2 t²`.
    pub fn polynomial_coefficients(&self) -> [Vector; 3] {
        [
            self.from.to_vector(),
            (self.ctrl - self.from) * 2.0,
            self.from.to_vector() - self.ctrl.to_vector() * 2.0 + self.to.to_vector(),
        ]
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        QuadraticBezierSegment {
            from: self.to,
            ctrl: self.ctrl,
            to: self.from,
        }
    }

    /// Return the parameter of the x extremum inside the curve, if any.
    pub fn local_x_extremum_t(&self) -> Option<f64> {
        let div = self.from.x - 2.0 * self.ctrl.x + self.to.x;
        if div == 0.0 {
            return None;
        }
        let t = (self.from.x - self.ctrl.x) / div;
        if t > 0.0 && t < 1.0 {
            return Some(t);
        }

        None
    }

    /// Return the parameter of the y extremum inside the curve, if any.
    pub fn local_y_extremum_t(&self) -> Option<f64> {
        let div = self.from.y - 2.0 * self.ctrl.y + self.to.y;
        if div == 0.0 {
            return None;
        }
        let t = (self.from.y - self.ctrl.y) / div;
        if t > 0.0 && t < 1.0 {
            return Some(t);
        }

        None
    }

    /// Returns the smallest rectangle the curve is contained in.
    ///
    /// Only the end points and the roots of the derivative are evaluated.
    pub fn bounding_box(&self) -> Box2D {
        let mut min = point(self.from.x.min(self.to.x), self.from.y.min(self.to.y));
        let mut max = point(self.from.x.max(self.to.x), self.from.y.max(self.to.y));

        if let Some(t) = self.local_x_extremum_t() {
            let x = self.x(t);
            min.x = min.x.min(x);
            max.x = max.x.max(x);
        }

        if let Some(t) = self.local_y_extremum_t() {
            let y = self.y(t);
            min.y = min.y.min(y);
            max.y = max.y.max(y);
        }

        Box2D { min, max }
    }

    /// Applies the transform to this curve and returns the results.
    pub fn transformed(&self, transform: &Transform) -> Self {
        QuadraticBezierSegment {
            from: transform.transform_point(self.from),
            ctrl: transform.transform_point(self.ctrl),
            to: transform.transform_point(self.to),
        }
    }

    /// Computes the length of this segment in closed form.
    pub fn length(&self) -> f64 {
        // Closed form from kurbo.
        // https://github.com/linebender/kurbo/blob/d0b956b47f219ba2303b4e2f2d904ea7b946e783/src/quadbez.rs#L239
        let d2 = self.from - self.ctrl * 2.0 + self.to.to_vector();
        let d1 = self.ctrl - self.from;
        let a = d2.square_length();
        let c = d1.square_length();
        if a < 1e-4 * c {
            // The segment is almost straight.
            //
            // Legendre-Gauss quadrature using formula from Behdad
            // in https://github.com/Pomax/BezierInfo-2/issues/77
            let v0 = (self.from.to_vector() * -0.492943519233745
                + self.ctrl.to_vector() * 0.430331482911935
                + self.to.to_vector() * 0.0626120363218102)
                .length();
            let v1 = ((self.to - self.from) * 0.4444444444444444).length();
            let v2 = (self.from.to_vector() * -0.0626120363218102
                + self.ctrl.to_vector() * -0.430331482911935
                + self.to.to_vector() * 0.492943519233745)
                .length();
            return v0 + v1 + v2;
        }

        let b = 2.0 * d2.dot(d1);

        let sqr_abc = (a + b + c).sqrt();
        let a2 = a.powf(-0.5);
        let a32 = a2.powi(3);
        let c2 = 2.0 * c.sqrt();
        let ba_c2 = b * a2 + c2;

        let v0 = 0.25 * a2 * a2 * b * (2.0 * sqr_abc - c2) + sqr_abc;

        if ba_c2 < f64::EPSILON {
            // The curve has a sharp turn.
            v0
        } else {
            v0 + 0.25
                * a32
                * (4.0 * c * a - b * b)
                * (((2.0 * a + b) * a2 + 2.0 * sqr_abc) / ba_c2).ln()
        }
    }
}

impl Evaluate for QuadraticBezierSegment {
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
            2 => self.second_derivative(),
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

#[test]
fn bounding_box_for_monotonic_quadratic_bezier_segment() {
    let a = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(0.0, 0.0),
        to: point(2.0, 0.0),
    };

    let expected_bounding_box = Box2D {
        min: point(0.0, 0.0),
        max: point(2.0, 0.0),
    };

    assert_eq!(a.bounding_box(), expected_bounding_box);
}

#[test]
fn bounding_box_for_quadratic_bezier_segment() {
    let a = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(2.0, 0.0),
        to: point(0.0, 0.0),
    };

    let expected_bounding_box = Box2D {
        min: point(0.0, 0.0),
        max: point(1.0, 0.0),
    };

    assert_eq!(a.bounding_box(), expected_bounding_box);
}

#[test]
fn derivatives() {
    let c1 = QuadraticBezierSegment {
        from: point(1.0, 1.0),
        ctrl: point(2.0, 1.0),
        to: point(2.0, 2.0),
    };

    assert_eq!(c1.derivative(0.0).y, 0.0);
    assert_eq!(c1.derivative(1.0).x, 0.0);
    assert_eq!(c1.derivative(0.5).x, c1.derivative(0.5).y);
    assert_eq!(c1.second_derivative(), Vector::new(-2.0, 2.0));
}

#[test]
fn arc_length() {
    let curves = [
        QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(100.0, 0.0),
            to: point(0.0, 100.0),
        },
        QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(100.0, 0.0),
            to: point(200.0, 0.0),
        },
        QuadraticBezierSegment {
            from: point(100.0, 0.0),
            ctrl: point(0.0, 0.0),
            to: point(50.0, 1.0),
        },
    ];

    for (idx, curve) in curves.iter().enumerate() {
        let length = curve.length();
        let steps = 100_000;
        let mut accum = 0.0;
        let mut prev = curve.from;
        for i in 1..=steps {
            let p = curve.sample(i as f64 / steps as f64);
            accum += (p - prev).length();
            prev = p;
        }

        assert!(
            (length - accum).abs() < 0.0001,
            "curve {:?}, {:?} == {:?}",
            idx,
            length,
            accum
        );
    }
}

#[test]
fn curvature_of_a_parabola() {
    // y = x² has a curvature of 2 at its apex.
    let c = QuadraticBezierSegment {
        from: point(-1.0, 1.0),
        ctrl: point(0.0, -1.0),
        to: point(1.0, 1.0),
    };
    let k = Evaluate::curvature(&c, 0.5).unwrap();
    assert!((k - 2.0).abs() < 1e-12);
}

#[test]
fn tangent_at_a_cusp() {
    // The control point coincides with the start: the first derivative vanishes at
    // t = 0 but the curve still leaves toward `to`.
    let c = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(0.0, 0.0),
        to: point(10.0, 0.0),
    };
    assert_eq!(Evaluate::tangent(&c, 0.0), Ok(Vector::new(1.0, 0.0)));
    assert_eq!(Evaluate::curvature(&c, 0.0), Ok(0.0));
}
