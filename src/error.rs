//! Error types for route computation.

use std::time::Duration;

use thiserror::Error;

use crate::models::{ItemId, Node, Position};

/// Errors that can occur while building a warehouse, validating an order,
/// or solving a route.
///
/// Only order validation and layout errors reach callers of
/// [`Router::compute_route`](crate::router::Router::compute_route); solver
/// failures are converted into a degraded route.
#[derive(Debug, Error)]
pub enum PickingError {
    /// The same item was listed twice in one order.
    #[error("Invalid order: item {0} is listed more than once")]
    DuplicateItem(ItemId),

    /// The order references an item missing from the catalog.
    #[error("Invalid order: item {0} is not in the product catalog")]
    UnknownItem(ItemId),

    /// A position lies outside the grid.
    #[error("Position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },

    /// A shelf cannot be placed on the given cell.
    #[error("Cell {0} is already occupied")]
    OccupiedCell(Position),

    /// A node has no reachable incoming or outgoing edge.
    #[error("Node {0} has no reachable approach in the access graph")]
    IncompleteGraph(Node),

    /// The search finished without closing any tour.
    #[error("No complete tour exists through the access graph")]
    NoFeasibleTour,

    /// The time budget elapsed before any complete tour was found.
    #[error("Routing deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// A tour step has no stored edge.
    #[error("Access graph has no edge from {from} to {to}")]
    MissingEdge { from: Node, to: Node },

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for route computation.
pub type PickingResult<T> = std::result::Result<T, PickingError>;
