use crate::geom::DomainError;
use thiserror::Error;

/// Errors reported by the segment store.
#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum GeomstrError {
    #[error("The store is empty.")]
    EmptyStore,
    #[error("Index {index} is out of bounds (the store holds {len} segments).")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Segment {index} is a structural marker, not a geometric primitive.")]
    NotAPrimitive { index: usize },
    #[error("Step from {from:?} to {to:?} is neither orthogonal nor diagonal.")]
    NonUnitStep { from: (i64, i64), to: (i64, i64) },
    #[error(transparent)]
    Domain(#[from] DomainError),
}
