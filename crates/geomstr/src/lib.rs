#![deny(bare_trait_objects)]

//! Geometry for laser toolpaths.
//!
//! # Crates
//!
//! This meta-crate (`geomstr`) reexports the following sub-crates for convenience:
//!
//! * **geomstr_geom** - Lines, quadratic and cubic bézier curves, three-point arcs:
//!   evaluation, lengths, bounding boxes and intersections.
//! * **geomstr_path** - The segment store, its builders and transforms, travel
//!   optimization, merging and plotting on the device grid.
//! * **geomstr_algorithms** - Scanbeam containment queries and pattern tiling.
//!
//! Each `geomstr_<name>` crate is reexported as a `<name>` module in `geomstr`.
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! # Examples
//!
//! ## Building, optimizing and plotting a toolpath
//!
//! ```
//! use geomstr::math::point;
//! use geomstr::path::Geomstr;
//!
//! let mut path: Geomstr = Geomstr::new();
//! path.line(point(0.0, 0.0), point(50.0, 0.0), 0);
//! // Drawn backward: the laser has to travel from (50, 0) to (50, 50) first.
//! path.line(point(50.0, 50.0), point(50.0, 0.0), 0);
//! assert_eq!(path.travel_distance(), 50.0);
//!
//! assert_eq!(path.two_opt_distance(10), 0.0);
//!
//! let pixels: Vec<(i64, i64, usize)> = path.generator().collect();
//! assert_eq!(pixels.first(), Some(&(0, 0, 0)));
//! assert_eq!(pixels.last(), Some(&(50, 50, 0)));
//! ```
//!
//! ## Hit testing a shape with a hole
//!
//! ```
//! use geomstr::algorithms::Scanbeam;
//! use geomstr::math::point;
//! use geomstr::path::Geomstr;
//!
//! let mut path: Geomstr = Geomstr::new();
//! path.polyline(&[point(0.0, 0.0), point(50.0, 0.0), point(50.0, 50.0), point(0.0, 50.0)], 0);
//! path.close(0).unwrap();
//! path.end();
//! path.polyline(&[point(10.0, 10.0), point(40.0, 10.0), point(40.0, 40.0), point(10.0, 40.0)], 0);
//! path.close(0).unwrap();
//!
//! let mut beam = Scanbeam::new(&path);
//! assert!(beam.is_point_inside(5.0, 25.0, 0.0));
//! assert!(!beam.is_point_inside(25.0, 25.0, 0.0));
//! ```

pub extern crate geomstr_algorithms;

pub use geomstr_algorithms as algorithms;
pub use algorithms::geom;
pub use algorithms::path;

pub use path::math;
