//! Any-angle pathfinding on grid vertices.
//!
//! This crate provides the search half of an any-angle planner working on
//! the vertices of an [`Occupancy`](anyangle_core::Occupancy) grid:
//!
//! - **Taut successors** of a vertex, found by sweeping rows of exact
//!   rational intervals ([`LineOfSightScanner`])
//! - **Bounded jump point search**, pruned by the ellipse a known path
//!   length allows ([`SearchContext::bounded_jps_path`])
//! - A sparse **visibility index** whose heuristics the bounded search
//!   refines as a side effect ([`VisibilityIndex`], [`SparseVisibilityIndex`])
//!
//! Both [`LineOfSightScanner`] and [`SearchContext`] own and reuse their
//! buffers, so repeated queries allocate nothing once warmed up.
//!
//! # Example
//!
//! ```
//! use anyangle_core::{BlockGrid, Point};
//! use anyangle_paths::SearchContext;
//!
//! let grid: BlockGrid = "....\n.#..\n....".parse().unwrap();
//! let mut ctx = SearchContext::default();
//! let outcome = ctx
//!     .bounded_jps_path(&grid, Point::new(0, 0), Point::new(4, 3), 8.0, &mut ())
//!     .unwrap();
//! assert!(outcome.is_found());
//! ```

mod bounded;
mod config;
mod costmap;
mod heap;
mod outcome;
mod scanner;
mod trace;
mod traits;
mod visibility;

pub use bounded::{SearchContext, SearchStats};
pub use config::{APPROXIMATION_RATIO, ELLIPSE_BUFFER, SearchConfig};
pub use costmap::CostMap;
pub use heap::IndexedHeap;
pub use outcome::{Path, PathOutcome, SearchError};
pub use scanner::{LineOfSightScanner, ScanMode};
pub use trace::{SearchEvent, Trace, TraceDecoder, TraceEncoder};
pub use traits::VisibilityIndex;
pub use visibility::SparseVisibilityIndex;
