#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! The geomstr segment store.
//!
//! A [`Geomstr`] is a flat array of [`Segment`] records: geometric primitives (points,
//! lines, quadratic and cubic béziers, three-point arcs) and structural markers
//! (vertices and ends). Consecutive records are implicitly connected by a travel
//! move unless an end marker separates them, and vertex markers sharing an id are the
//! same node of the toolpath graph.
//!
//! This crate is reexported in `geomstr`.
//!
//! # Examples
//!
//! ```
//! use geomstr_path::Geomstr;
//! use geomstr_path::math::point;
//!
//! let mut path: Geomstr = Geomstr::new();
//! path.line(point(0.0, 0.0), point(10.0, 0.0), 0);
//! path.line(point(10.0, 0.0), point(10.0, 10.0), 0);
//! path.close(0).unwrap();
//!
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.raw_length(), 20.0 + 200.0f64.sqrt());
//!
//! for (x, y, settings) in path.generator() {
//!     println!("{} {} {}", x, y, settings);
//! }
//! ```

pub use geomstr_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod error;
pub mod geomstr;
pub mod plot;
mod segment;

#[doc(inline)]
pub use crate::error::GeomstrError;
#[doc(inline)]
pub use crate::geomstr::{Geomstr, Intersection};
#[doc(inline)]
pub use crate::plot::{unit_steps, BresenhamLine, Pixel, Plot};
#[doc(inline)]
pub use crate::segment::{Connection, Segment, SegmentKind, VertexId};

pub mod math {
    //! The f64 euclid aliases of `geomstr_geom`, reexported for convenience.

    pub use crate::geom::math::*;
}
