#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Algorithms built on top of the geomstr segment store.
//!
//! - [`scanbeam`]: a sweep line over a finished store answering point in polygon
//!   queries.
//! - [`pattern`]: tiling of a small prototype store over a rectangle, for hatch fills.
//!
//! This crate is reexported in `geomstr`.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub extern crate geomstr_path as path;

pub mod pattern;
pub mod scanbeam;

pub use crate::path::geom;
pub use crate::path::math;

#[doc(inline)]
pub use crate::pattern::{Pattern, PatternCommand, PatternError};
#[doc(inline)]
pub use crate::scanbeam::Scanbeam;
