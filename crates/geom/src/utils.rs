//! Polynomial helpers shared by the evaluators and the intersection routines.

use crate::error::DomainError;
use crate::math::Vector;
use arrayvec::ArrayVec;

use core::ops::{Add, Mul, Sub};

/// Relative threshold under which a leading coefficient is considered to be zero.
const DEGENERATE_COEFFICIENT: f64 = 1e-12;

/// Relative threshold used when deciding whether a derivative vanishes.
const VANISHING_DERIVATIVE: f64 = 1e-9;

#[inline]
pub fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Real roots of `a*t² + b*t + c`, in increasing order.
///
/// Falls back to the linear equation when `a` is negligible compared to the other
/// coefficients. A double root is reported once.
pub fn quadratic_polynomial_roots(a: f64, b: f64, c: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return result;
    }

    if a.abs() <= DEGENERATE_COEFFICIENT * scale {
        if b.abs() > DEGENERATE_COEFFICIENT * scale {
            result.push(-c / b);
        }
        return result;
    }

    let delta = b * b - 4.0 * a * c;
    if delta.abs() <= DEGENERATE_COEFFICIENT * b * b || delta == 0.0 {
        result.push(-b / (2.0 * a));
        return result;
    }

    if delta < 0.0 {
        return result;
    }

    // Avoid the cancellation between -b and sqrt(delta) by computing the larger
    // root first and deriving the other one from the product of the roots.
    let q = -0.5 * (b + b.signum() * delta.sqrt());
    let (t1, t2) = min_max(q / a, c / q);
    result.push(t1);
    result.push(t2);

    result
}

/// Real roots of `a*t³ + b*t² + c*t + d`, in increasing order.
///
/// Falls back to the quadratic equation when `a` is negligible compared to the other
/// coefficients. Repeated roots are reported once.
pub fn cubic_polynomial_roots(a: f64, b: f64, c: f64, d: f64) -> ArrayVec<f64, 3> {
    let mut result = ArrayVec::new();
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 {
        return result;
    }

    if a.abs() <= DEGENERATE_COEFFICIENT * scale {
        for root in quadratic_polynomial_roots(b, c, d) {
            result.push(root);
        }
        return result;
    }

    let bn = b / a;
    let cn = c / a;
    let dn = d / a;
    let shift = bn / 3.0;

    // Depressed cubic t³ + p*t + q.
    let p = (3.0 * cn - bn * bn) / 3.0;
    let q = (2.0 * bn * bn * bn - 9.0 * bn * cn + 27.0 * dn) / 27.0;

    let half_q2 = (q * 0.5) * (q * 0.5);
    let third_p3 = (p / 3.0) * (p / 3.0) * (p / 3.0);
    let discriminant = half_q2 + third_p3;
    let tolerance = DEGENERATE_COEFFICIENT * half_q2.max(third_p3.abs());

    if discriminant.abs() <= tolerance {
        if p.abs() <= DEGENERATE_COEFFICIENT * (bn * bn + cn.abs()) {
            // Triple root.
            result.push(-shift);
        } else {
            let (r1, r2) = min_max(3.0 * q / p - shift, -1.5 * q / p - shift);
            result.push(r1);
            result.push(r2);
        }
    } else if discriminant > 0.0 {
        let sqrt_disc = discriminant.sqrt();
        let u = (-q * 0.5 + sqrt_disc).cbrt();
        let v = (-q * 0.5 - sqrt_disc).cbrt();
        result.push(u + v - shift);
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0).acos();
        let tau = core::f64::consts::TAU;
        for k in 0..3 {
            result.push(2.0 * r * ((phi - tau * k as f64) / 3.0).cos() - shift);
        }
    }

    // One or two newton steps recover the precision lost in the closed form.
    for root in result.iter_mut() {
        for _ in 0..2 {
            let f = ((a * *root + b) * *root + c) * *root + d;
            let df = (3.0 * a * *root + 2.0 * b) * *root + c;
            if df.abs() <= DEGENERATE_COEFFICIENT * scale {
                break;
            }
            *root -= f / df;
        }
    }

    result.sort_by(|a, b| a.total_cmp(b));
    dedup_roots(&mut result, 1e-9);

    result
}

/// Removes roots closer than `tolerance` to their predecessor. Expects sorted input.
pub fn dedup_roots<const N: usize>(roots: &mut ArrayVec<f64, N>, tolerance: f64) {
    let mut deduped: ArrayVec<f64, N> = ArrayVec::new();
    for &root in roots.iter() {
        match deduped.last() {
            Some(&prev) if (root - prev).abs() <= tolerance => {}
            _ => deduped.push(root),
        }
    }
    *roots = deduped;
}

/// A polynomial in power basis, lowest degree first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: &[f64]) -> Self {
        Polynomial {
            coefficients: coefficients.to_vec(),
        }
    }

    pub fn zero() -> Self {
        Polynomial {
            coefficients: Vec::new(),
        }
    }

    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|&c| c == 0.0)
    }

    /// Horner evaluation.
    pub fn eval(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    pub fn derivative(&self) -> Self {
        Polynomial {
            coefficients: self
                .coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(power, &c)| c * power as f64)
                .collect(),
        }
    }

    /// Sum of the absolute values of the coefficients, an upper bound of `|p(t)|`
    /// over `[-1, 1]`.
    pub fn magnitude(&self) -> f64 {
        self.coefficients.iter().map(|c| c.abs()).sum()
    }

    pub fn pow(&self, exponent: u32) -> Self {
        let mut result = Polynomial::new(&[1.0]);
        for _ in 0..exponent {
            result = &result * self;
        }
        result
    }
}

impl<'l> Add for &'l Polynomial {
    type Output = Polynomial;
    fn add(self, other: &'l Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..len)
            .map(|i| {
                self.coefficients.get(i).copied().unwrap_or(0.0)
                    + other.coefficients.get(i).copied().unwrap_or(0.0)
            })
            .collect();
        Polynomial { coefficients }
    }
}

impl<'l> Sub for &'l Polynomial {
    type Output = Polynomial;
    fn sub(self, other: &'l Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficients = (0..len)
            .map(|i| {
                self.coefficients.get(i).copied().unwrap_or(0.0)
                    - other.coefficients.get(i).copied().unwrap_or(0.0)
            })
            .collect();
        Polynomial { coefficients }
    }
}

impl<'l> Mul for &'l Polynomial {
    type Output = Polynomial;
    fn mul(self, other: &'l Polynomial) -> Polynomial {
        if self.coefficients.is_empty() || other.coefficients.is_empty() {
            return Polynomial::zero();
        }
        let mut coefficients = vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }
        Polynomial { coefficients }
    }
}

/// Splits power basis vector coefficients into the x and y polynomials.
pub fn split_coefficients(coefficients: &[Vector]) -> (Polynomial, Polynomial) {
    let x: Vec<f64> = coefficients.iter().map(|c| c.x).collect();
    let y: Vec<f64> = coefficients.iter().map(|c| c.y).collect();
    (Polynomial::new(&x), Polynomial::new(&y))
}

/// Limit of `num(s) / den(s)` as `s` goes to `t`, by repeated application of
/// l'Hôpital's rule.
///
/// Returns `None` when the denominator keeps vanishing while the numerator does not
/// (the ratio diverges) or when the denominator is the zero polynomial.
pub fn ratio_limit(num: &Polynomial, den: &Polynomial, t: f64) -> Option<f64> {
    let mut num = num.clone();
    let mut den = den.clone();
    loop {
        if den.is_zero() {
            return None;
        }

        let n = num.eval(t);
        let d = den.eval(t);
        if d.abs() > VANISHING_DERIVATIVE * den.magnitude() {
            return Some(n / d);
        }

        if n.abs() > VANISHING_DERIVATIVE * num.magnitude() {
            return None;
        }

        num = num.derivative();
        den = den.derivative();
    }
}

/// Scale of the derivative of a polynomial curve, used to make vanishing tests
/// independent of the magnitude of the coordinates.
fn derivative_scale(coefficients: &[Vector]) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(power, c)| c.length() * power as f64)
        .sum()
}

/// Curvature of the polynomial curve described by `coefficients` (power basis,
/// lowest degree first) at `t`.
///
/// Where the first derivative vanishes, the curvature is computed as the limit of
/// the squared curvature `(x'y'' - y'x'')² / (x'² + y'²)³`, a ratio of polynomials.
pub fn polynomial_curvature(coefficients: &[Vector], t: f64) -> Result<f64, DomainError> {
    let scale = derivative_scale(coefficients);
    let (x, y) = split_coefficients(coefficients);
    let (dx, dy) = (x.derivative(), y.derivative());
    let (ddx, ddy) = (dx.derivative(), dy.derivative());

    let (vx, vy) = (dx.eval(t), dy.eval(t));
    let speed_sq = vx * vx + vy * vy;
    if scale > 0.0 && speed_sq.sqrt() > VANISHING_DERIVATIVE * scale {
        let cross = vx * ddy.eval(t) - vy * ddx.eval(t);
        return Ok(cross.abs() / (speed_sq * speed_sq.sqrt()));
    }

    let cross = &(&dx * &ddy) - &(&dy * &ddx);
    let speed = &(&dx * &dx) + &(&dy * &dy);
    match ratio_limit(&cross.pow(2), &speed.pow(3), t) {
        Some(squared) if squared.is_finite() => Ok(squared.max(0.0).sqrt()),
        _ => Err(DomainError::UndefinedCurvature { t }),
    }
}

/// Unit tangent of the polynomial curve described by `coefficients` at `t`.
///
/// At a point where the first derivative vanishes, the direction is given by the
/// first non-vanishing higher derivative, oriented as the curve is approached from
/// inside the `[0, 1]` range.
pub fn polynomial_tangent(coefficients: &[Vector], t: f64) -> Result<Vector, DomainError> {
    let scale = derivative_scale(coefficients);
    let (mut x, mut y) = split_coefficients(coefficients);
    if scale == 0.0 {
        return Err(DomainError::UndefinedTangent { t });
    }

    for order in 1..coefficients.len() {
        x = x.derivative();
        y = y.derivative();
        let v = Vector::new(x.eval(t), y.eval(t));
        if v.length() > VANISHING_DERIVATIVE * scale {
            // (s - t)^(order - 1) is negative when approaching t = 1 from below.
            let flip = t >= 1.0 && order % 2 == 0;
            let v = v.normalize();
            return Ok(if flip { -v } else { v });
        }
    }

    Err(DomainError::UndefinedTangent { t })
}

#[test]
fn quadratic_polynomial() {
    assert_eq!(quadratic_polynomial_roots(1.0, -3.0, 2.0).as_slice(), &[1.0, 2.0]);
    assert_eq!(quadratic_polynomial_roots(1.0, -2.0, 1.0).as_slice(), &[1.0]);
    assert!(quadratic_polynomial_roots(1.0, 0.0, 1.0).is_empty());
    assert_eq!(quadratic_polynomial_roots(0.0, 2.0, -1.0).as_slice(), &[0.5]);
    assert!(quadratic_polynomial_roots(0.0, 0.0, 0.0).is_empty());
}

#[test]
fn cubic_polynomial() {
    fn assert_approx_eq(a: ArrayVec<f64, 3>, b: &[f64], epsilon: f64) {
        if a.len() != b.len() {
            println!("{a:?} != {b:?}");
        }
        assert_eq!(a.len(), b.len());
        for i in 0..a.len() {
            if (a[i] - b[i]).abs() > epsilon {
                println!("{a:?} != {b:?}");
            }
            assert!((a[i] - b[i]).abs() <= epsilon);
        }
    }

    assert_approx_eq(cubic_polynomial_roots(2.0, -4.0, 2.0, 0.0), &[0.0, 1.0], 1e-7);
    assert_approx_eq(cubic_polynomial_roots(-1.0, 1.0, -1.0, 1.0), &[1.0], 1e-9);
    assert_approx_eq(cubic_polynomial_roots(-2.0, 2.0, -1.0, 10.0), &[2.0], 1e-9);
    // (t - 0.25)(t - 0.5)(t - 0.75)
    assert_approx_eq(
        cubic_polynomial_roots(1.0, -1.5, 0.6875, -0.09375),
        &[0.25, 0.5, 0.75],
        1e-9,
    );
    // Degenerates to a quadratic.
    assert_approx_eq(cubic_polynomial_roots(0.0, 1.0, -3.0, 2.0), &[1.0, 2.0], 1e-9);
}

#[test]
fn polynomial_arithmetic() {
    let p = Polynomial::new(&[1.0, 2.0, 3.0]);
    let q = Polynomial::new(&[0.0, 1.0]);
    assert_eq!(p.eval(2.0), 17.0);
    assert_eq!(p.derivative().coefficients(), &[2.0, 6.0]);
    assert_eq!((&p * &q).coefficients(), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!((&p - &p).eval(3.0), 0.0);
    assert_eq!((&p + &q).coefficients(), &[1.0, 3.0, 3.0]);
    assert_eq!(q.pow(3).coefficients(), &[0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn limit_of_ratio() {
    // t² / (2t²) at 0.
    let num = Polynomial::new(&[0.0, 0.0, 1.0]);
    let den = Polynomial::new(&[0.0, 0.0, 2.0]);
    assert_eq!(ratio_limit(&num, &den, 0.0), Some(0.5));
    // t / t³ diverges.
    let num = Polynomial::new(&[0.0, 1.0]);
    let den = Polynomial::new(&[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(ratio_limit(&num, &den, 0.0), None);
    // Zero denominator.
    assert_eq!(ratio_limit(&num, &Polynomial::zero(), 0.0), None);
}
