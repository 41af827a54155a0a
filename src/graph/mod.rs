//! Access graph, its cost plane, and lower-bound reduction.
//!
//! - [`AccessGraph`]: immutable shortest paths between item approach points
//! - [`CostMatrix`]: dense mutable copy of the approach costs
//! - [`reduce`]: row/column reduction used by branch-and-bound

mod access;
mod matrix;
mod reduction;

pub use access::{AccessGraph, Approach, Edge, EdgeKey};
pub use matrix::{CostMatrix, SLOTS};
pub use reduction::{reduce, Commit};
