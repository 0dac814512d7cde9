//! **anyangle-core**: core types for any-angle pathfinding on tile grids.
//!
//! This crate provides the geometry shared by the rest of the workspace:
//! integer points and ranges, exact fractions for visibility boundaries,
//! octile distance, and the occupancy grid contract with a dense
//! implementation that can be read from text.

pub mod ascii;
pub mod distance;
pub mod fraction;
pub mod geom;
pub mod grid;

pub use ascii::MapParseError;
pub use distance::{SQRT_2, chebyshev, octile};
pub use fraction::{Fraction, ZeroDenominator};
pub use geom::{Point, Range};
pub use grid::{BlockGrid, Occupancy};
