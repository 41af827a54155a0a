//! Grid shortest paths.
//!
//! Provides single-source, single-target shortest paths around shelves on
//! the warehouse floor.

mod grid_search;

pub use grid_search::{shortest_path, GridPath};
