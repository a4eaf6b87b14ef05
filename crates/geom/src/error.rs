use thiserror::Error;

/// A quantity that has no well defined value at the requested parameter.
///
/// This only happens at degenerate points of a curve, where the first derivative
/// vanishes and no finite limit can be derived from the higher derivatives.
#[non_exhaustive]
#[derive(Error, Copy, Clone, Debug, PartialEq)]
pub enum DomainError {
    #[error("Curvature is undefined at t = {t}: the limit at this cusp does not exist.")]
    UndefinedCurvature { t: f64 },
    #[error("Tangent is undefined at t = {t}: every derivative of the curve vanishes.")]
    UndefinedTangent { t: f64 },
}
