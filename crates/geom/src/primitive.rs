use crate::arc::Arc;
use crate::cubic_bezier::CubicBezierSegment;
use crate::error::DomainError;
use crate::line::LineSegment;
use crate::math::{Box2D, Point, Transform, Vector};
use crate::quadratic_bezier::QuadraticBezierSegment;

use arrayvec::ArrayVec;

/// Closed form evaluation shared by every primitive.
///
/// The parameter `t` goes from `0.0` at the start of the primitive to `1.0` at its end.
pub trait Evaluate {
    /// Start of the primitive.
    fn from(&self) -> Point;

    /// End of the primitive.
    fn to(&self) -> Point;

    /// Sample the primitive at t (expecting t between 0 and 1).
    fn sample(&self, t: f64) -> Point;

    /// Sample the primitive at each of the provided parameters.
    fn sample_all(&self, ts: &[f64]) -> Vec<Point> {
        ts.iter().map(|&t| self.sample(t)).collect()
    }

    /// The n-th derivative with respect to t.
    ///
    /// `n = 0` returns the position as a vector. Derivatives past the degree of a
    /// polynomial primitive are zero.
    fn derivative(&self, t: f64, n: u32) -> Vector;

    /// Unsigned curvature at t.
    ///
    /// Where the first derivative vanishes the curvature is the limit of the curvature
    /// as the parameter approaches t, and an error is returned if that limit does not
    /// exist.
    fn curvature(&self, t: f64) -> Result<f64, DomainError>;

    /// Unit tangent at t, in the direction of increasing t.
    fn tangent(&self, t: f64) -> Result<Vector, DomainError>;

    /// Arc length of the whole primitive.
    fn length(&self) -> f64;

    /// Smallest axis-aligned rectangle containing the primitive.
    fn bounding_box(&self) -> Box2D;

    /// The same geometry traversed in the opposite direction.
    fn reversed(&self) -> Self
    where
        Self: Sized;

    fn transformed(&self, transform: &Transform) -> Self
    where
        Self: Sized;
}

/// Any of the geometric primitives a store record can hold.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Primitive {
    Point(Point),
    Line(LineSegment),
    Quadratic(QuadraticBezierSegment),
    Cubic(CubicBezierSegment),
    Arc(Arc),
}

impl Primitive {
    /// Power basis coefficients of the polynomial primitives, lowest degree first.
    ///
    /// Returns `None` for arcs.
    pub fn polynomial_coefficients(&self) -> Option<ArrayVec<Vector, 4>> {
        match self {
            Primitive::Point(p) => Some(core::iter::once(p.to_vector()).collect()),
            Primitive::Line(line) => Some(line.polynomial_coefficients().into_iter().collect()),
            Primitive::Quadratic(curve) => {
                Some(curve.polynomial_coefficients().into_iter().collect())
            }
            Primitive::Cubic(curve) => Some(curve.polynomial_coefficients().into_iter().collect()),
            Primitive::Arc(_) => None,
        }
    }

    /// Returns true for the bézier and line primitives, which have a polynomial
    /// description and a closed form bounding box.
    #[inline]
    pub fn is_polynomial(&self) -> bool {
        !matches!(self, Primitive::Arc(_))
    }
}

impl Evaluate for Primitive {
    fn from(&self) -> Point {
        match self {
            Primitive::Point(p) => *p,
            Primitive::Line(s) => s.from,
            Primitive::Quadratic(s) => s.from,
            Primitive::Cubic(s) => s.from,
            Primitive::Arc(s) => s.from,
        }
    }

    fn to(&self) -> Point {
        match self {
            Primitive::Point(p) => *p,
            Primitive::Line(s) => s.to,
            Primitive::Quadratic(s) => s.to,
            Primitive::Cubic(s) => s.to,
            Primitive::Arc(s) => s.to,
        }
    }

    fn sample(&self, t: f64) -> Point {
        match self {
            Primitive::Point(p) => *p,
            Primitive::Line(s) => s.sample(t),
            Primitive::Quadratic(s) => s.sample(t),
            Primitive::Cubic(s) => s.sample(t),
            Primitive::Arc(s) => s.sample(t),
        }
    }

    fn derivative(&self, t: f64, n: u32) -> Vector {
        match self {
            Primitive::Point(p) if n == 0 => p.to_vector(),
            Primitive::Point(_) => Vector::zero(),
            Primitive::Line(s) => Evaluate::derivative(s, t, n),
            Primitive::Quadratic(s) => Evaluate::derivative(s, t, n),
            Primitive::Cubic(s) => Evaluate::derivative(s, t, n),
            Primitive::Arc(s) => Evaluate::derivative(s, t, n),
        }
    }

    fn curvature(&self, t: f64) -> Result<f64, DomainError> {
        match self {
            Primitive::Point(_) => Err(DomainError::UndefinedCurvature { t }),
            Primitive::Line(s) => s.curvature(t),
            Primitive::Quadratic(s) => s.curvature(t),
            Primitive::Cubic(s) => s.curvature(t),
            Primitive::Arc(s) => s.curvature(t),
        }
    }

    fn tangent(&self, t: f64) -> Result<Vector, DomainError> {
        match self {
            Primitive::Point(_) => Err(DomainError::UndefinedTangent { t }),
            Primitive::Line(s) => s.tangent(t),
            Primitive::Quadratic(s) => s.tangent(t),
            Primitive::Cubic(s) => s.tangent(t),
            Primitive::Arc(s) => s.tangent(t),
        }
    }

    fn length(&self) -> f64 {
        match self {
            Primitive::Point(_) => 0.0,
            Primitive::Line(s) => s.length(),
            Primitive::Quadratic(s) => s.length(),
            Primitive::Cubic(s) => s.length(),
            Primitive::Arc(s) => s.length(),
        }
    }

    fn bounding_box(&self) -> Box2D {
        match self {
            Primitive::Point(p) => Box2D { min: *p, max: *p },
            Primitive::Line(s) => s.bounding_box(),
            Primitive::Quadratic(s) => s.bounding_box(),
            Primitive::Cubic(s) => s.bounding_box(),
            Primitive::Arc(s) => s.bounding_box(),
        }
    }

    fn reversed(&self) -> Self {
        match self {
            Primitive::Point(p) => Primitive::Point(*p),
            Primitive::Line(s) => Primitive::Line(s.flip()),
            Primitive::Quadratic(s) => Primitive::Quadratic(s.flip()),
            Primitive::Cubic(s) => Primitive::Cubic(s.flip()),
            Primitive::Arc(s) => Primitive::Arc(s.flip()),
        }
    }

    fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Primitive::Point(p) => Primitive::Point(transform.transform_point(*p)),
            Primitive::Line(s) => Primitive::Line(s.transformed(transform)),
            Primitive::Quadratic(s) => Primitive::Quadratic(s.transformed(transform)),
            Primitive::Cubic(s) => Primitive::Cubic(s.transformed(transform)),
            Primitive::Arc(s) => Primitive::Arc(s.transformed(transform)),
        }
    }
}

impl From<LineSegment> for Primitive {
    fn from(s: LineSegment) -> Self {
        Primitive::Line(s)
    }
}

impl From<QuadraticBezierSegment> for Primitive {
    fn from(s: QuadraticBezierSegment) -> Self {
        Primitive::Quadratic(s)
    }
}

impl From<CubicBezierSegment> for Primitive {
    fn from(s: CubicBezierSegment) -> Self {
        Primitive::Cubic(s)
    }
}

impl From<Arc> for Primitive {
    fn from(s: Arc) -> Self {
        Primitive::Arc(s)
    }
}

#[cfg(test)]
fn assert_same_box(actual: Box2D, expected: lyon_geom::Box2D<f64>) {
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * (1.0 + b.abs());
    assert!(
        close(actual.min.x, expected.min.x)
            && close(actual.min.y, expected.min.y)
            && close(actual.max.x, expected.max.x)
            && close(actual.max.y, expected.max.y),
        "{:?} != {:?}",
        actual,
        expected
    );
}

#[test]
fn bounding_boxes_match_lyon_geom() {
    use crate::math::point;
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(17);
    let mut p = || point(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0));
    let lp = |p: Point| lyon_geom::point(p.x, p.y);

    for _ in 0..1000 {
        let line = LineSegment::new(p(), p());
        let reference = lyon_geom::LineSegment {
            from: lp(line.from),
            to: lp(line.to),
        };
        assert_same_box(Primitive::Line(line).bounding_box(), reference.bounding_box());

        let quad = QuadraticBezierSegment {
            from: p(),
            ctrl: p(),
            to: p(),
        };
        let reference = lyon_geom::QuadraticBezierSegment {
            from: lp(quad.from),
            ctrl: lp(quad.ctrl),
            to: lp(quad.to),
        };
        assert_same_box(Primitive::Quadratic(quad).bounding_box(), reference.bounding_box());

        let cubic = CubicBezierSegment {
            from: p(),
            ctrl1: p(),
            ctrl2: p(),
            to: p(),
        };
        let reference = lyon_geom::CubicBezierSegment {
            from: lp(cubic.from),
            ctrl1: lp(cubic.ctrl1),
            ctrl2: lp(cubic.ctrl2),
            to: lp(cubic.to),
        };
        assert_same_box(Primitive::Cubic(cubic).bounding_box(), reference.bounding_box());
    }
}

#[test]
fn bounding_box_contains_samples() {
    use crate::math::point;

    let primitives = [
        Primitive::Point(point(3.0, 4.0)),
        Primitive::Line(LineSegment::new(point(0.0, 0.0), point(-5.0, 2.0))),
        Primitive::Quadratic(QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(10.0, 30.0),
            to: point(20.0, 0.0),
        }),
        Primitive::Arc(Arc::new(point(0.0, 0.0), point(5.0, 5.0), point(10.0, 0.0))),
    ];

    for primitive in &primitives {
        let bb = primitive.bounding_box().inflate(1e-9, 1e-9);
        for i in 0..=100 {
            let p = primitive.sample(i as f64 / 100.0);
            assert!(bb.min.x <= p.x && p.x <= bb.max.x);
            assert!(bb.min.y <= p.y && p.y <= bb.max.y);
        }
    }
}

#[test]
fn reversed_primitives_swap_end_points() {
    use crate::math::point;

    let cubic = Primitive::Cubic(CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 2.0),
        ctrl2: point(3.0, 2.0),
        to: point(4.0, 0.0),
    });
    let reversed = cubic.reversed();
    assert_eq!(reversed.from(), cubic.to());
    assert_eq!(reversed.to(), cubic.from());
    assert_eq!(reversed.sample(0.25), cubic.sample(0.75));
    assert_eq!(cubic.polynomial_coefficients().map(|c| c.len()), Some(4));
    assert!(Primitive::Arc(Arc::new(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0)))
        .polynomial_coefficients()
        .is_none());
}
