#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]

//! Geometric primitives of the geomstr segment store.
//!
//! This crate is reexported in `geomstr`.
//!
//! # Overview
//!
//! This crate implements the maths needed to reason about the primitives a laser
//! toolpath is made of:
//!
//! - line segments,
//! - quadratic and cubic bézier curves,
//! - circular arcs described by three points (start, a point on the arc, end),
//! - points.
//!
//! Every primitive can be sampled, differentiated, measured and bounded in closed
//! form through the [`Evaluate`] trait. The [`intersection`] module finds the
//! parameters at which two primitives cross, using exact solvers for lines and
//! a bounded sampling/zoom refinement for everything else.
//!
//! All coordinates are `f64`. The `t` parameter of every primitive goes from `0.0`
//! at its start to `1.0` at its end.

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod arc;
pub mod cubic_bezier;
mod error;
pub mod intersection;
mod line;
mod primitive;
pub mod quadratic_bezier;
pub mod utils;

#[doc(inline)]
pub use crate::arc::Arc;
#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::error::DomainError;
#[doc(inline)]
pub use crate::intersection::{intersections, IntersectionOptions};
#[doc(inline)]
pub use crate::line::LineSegment;
#[doc(inline)]
pub use crate::primitive::{Evaluate, Primitive};
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

pub mod math {
    //! f64 version of the euclid types used everywhere. The other geomstr crates
    //! reexport them.

    use crate::euclid;

    /// Alias for ```euclid::default::Point2D<f64>```.
    pub type Point = euclid::default::Point2D<f64>;

    /// Alias for ```euclid::default::Vector2D<f64>```.
    pub type Vector = euclid::default::Vector2D<f64>;

    /// Alias for ```euclid::default::Box2D<f64>```.
    pub type Box2D = euclid::default::Box2D<f64>;

    /// Alias for ```euclid::default::Transform2D<f64>```.
    pub type Transform = euclid::default::Transform2D<f64>;

    /// An angle in radians (f64).
    pub type Angle = euclid::Angle<f64>;

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    /// Returns whether two boxes overlap, touching edges included.
    ///
    /// Unlike `Box2D::intersects` this accepts degenerate (zero width or height)
    /// boxes, which is what the bounding box of an axis-aligned line looks like.
    #[inline]
    pub fn boxes_overlap(a: &Box2D, b: &Box2D) -> bool {
        a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
    }
}
