//! # u-picking
//!
//! Warehouse order-picking route optimization: shortest paths around
//! shelves, access graphs between shelf approach points, and exact or
//! heuristic tours under a wall-clock budget.
//!
//! ## Modules
//!
//! - [`models`]: Domain types (Position, Direction, Grid, Warehouse, Order, Tour)
//! - [`pathfinding`]: Grid shortest paths around shelves
//! - [`graph`]: Access graph, cost matrix and matrix reduction
//! - [`solver`]: Branch-and-bound, repetitive nearest neighbor, localized min path
//! - [`assembly`]: Tour rotation, path resolution and worker instructions
//! - [`router`]: Route computation entry point with fallbacks
//! - [`config`]: Router configuration
//! - [`error`]: Error types

pub mod assembly;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod pathfinding;
pub mod router;
pub mod solver;
