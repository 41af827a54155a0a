//! Route assembly: from a solved tour to worker instructions.
//!
//! - [`rotate`]: shift a closed tour so it begins at `Start`
//! - [`resolve`]: concatenate the stored edge paths of a tour
//! - [`collapse_directions`]: keep only turning points of a path
//! - [`to_instructions`]: human-readable steps with pick-ups

mod collapse;
mod instructions;

pub use collapse::{collapse_directions, collapse_directions_keeping};
pub use instructions::{to_instructions, Instruction};

use crate::error::{PickingError, PickingResult};
use crate::graph::{AccessGraph, EdgeKey};
use crate::models::{Node, Position, Tour};

/// Rotates `tour` so that `Start` comes first.
///
/// Tours without `Start` are returned unchanged.
///
/// # Examples
///
/// ```
/// use u_picking::assembly::rotate;
/// use u_picking::models::{Node, Tour, TourStop};
///
/// let tour = Tour::from_stops(vec![
///     TourStop::new(Node::Item(1), None),
///     TourStop::end(),
///     TourStop::start(),
/// ]);
/// let rotated = rotate(&tour);
/// assert_eq!(rotated.nodes(), vec![Node::Start, Node::Item(1), Node::End]);
/// assert_eq!(rotate(&rotated), rotated);
/// ```
pub fn rotate(tour: &Tour) -> Tour {
    let mut stops = tour.stops().to_vec();
    if let Some(pos) = tour.position_of(Node::Start) {
        stops.rotate_left(pos);
    }
    Tour::from_stops(stops)
}

/// Concatenates the stored paths between consecutive stops of `tour`.
///
/// The seam position shared by two adjacent paths appears once.
///
/// # Errors
///
/// [`PickingError::MissingEdge`] if a step has no reachable stored path.
pub fn resolve(graph: &AccessGraph, tour: &Tour) -> PickingResult<Vec<Position>> {
    let mut out: Vec<Position> = Vec::new();

    for pair in tour.stops().windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let missing = || PickingError::MissingEdge {
            from: from.node,
            to: to.node,
        };

        let source = graph.node_index(from.node).ok_or_else(missing)?;
        let dest = graph.node_index(to.node).ok_or_else(missing)?;
        let approach = graph
            .find(EdgeKey {
                source,
                dest,
                side: from.side,
            })
            .and_then(|edge| edge.approach(to.side))
            .filter(|a| a.cost.is_some())
            .ok_or_else(missing)?;

        let mut path = approach.path.iter().copied();
        if let (Some(&last), Some(head)) = (out.last(), approach.path.first()) {
            if last == *head {
                path.next();
            }
        }
        out.extend(path);
    }

    Ok(out)
}
