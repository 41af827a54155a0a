//! Domain model types for warehouse order picking.
//!
//! Provides the core abstractions: grid positions and approach directions,
//! the floor grid, the warehouse with its product catalog, validated orders
//! of logical nodes, and tours through those nodes.

mod cost;
mod grid;
mod node;
mod position;
mod tour;
mod warehouse;

pub use cost::{add_cost, Cost, INFINITE_COST};
pub use grid::{Cell, Grid};
pub use node::{ItemId, Node, Order};
pub use position::{Direction, Position};
pub use tour::{Tour, TourStop};
pub use warehouse::Warehouse;
