//! Tour and tour stop types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Direction, Node};

/// One stop of a tour: a node and the side it is approached from.
///
/// `Start` and `End` are approached omnidirectionally (`side == None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TourStop {
    /// Node being visited.
    pub node: Node,
    /// Approach side of the node's shelf.
    pub side: Option<Direction>,
}

impl TourStop {
    /// Creates a new stop.
    pub fn new(node: Node, side: Option<Direction>) -> Self {
        Self { node, side }
    }

    /// The `(Start, None)` stop.
    pub fn start() -> Self {
        Self::new(Node::Start, None)
    }

    /// The `(End, None)` stop.
    pub fn end() -> Self {
        Self::new(Node::End, None)
    }
}

impl fmt::Display for TourStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Some(side) => write!(f, "{}@{}", self.node, side),
            None => write!(f, "{}", self.node),
        }
    }
}

/// An ordered visiting sequence with one approach side per node.
///
/// # Examples
///
/// ```
/// use u_picking::models::{Direction, Node, Tour, TourStop};
///
/// let tour = Tour::from_stops(vec![
///     TourStop::start(),
///     TourStop::new(Node::Item(3), Some(Direction::West)),
///     TourStop::end(),
/// ]);
/// assert_eq!(tour.len(), 3);
/// assert_eq!(tour.nodes(), vec![Node::Start, Node::Item(3), Node::End]);
/// assert_eq!(tour.to_string(), "Start -> item 3@W -> End");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    stops: Vec<TourStop>,
}

impl Tour {
    /// Creates an empty tour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing stop sequence.
    pub fn from_stops(stops: Vec<TourStop>) -> Self {
        Self { stops }
    }

    /// Appends a stop.
    pub fn push(&mut self, stop: TourStop) {
        self.stops.push(stop);
    }

    /// The ordered stops.
    pub fn stops(&self) -> &[TourStop] {
        &self.stops
    }

    /// Consumes the tour, returning its stops.
    pub fn into_stops(self) -> Vec<TourStop> {
        self.stops
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the tour has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Nodes in visiting order.
    pub fn nodes(&self) -> Vec<Node> {
        self.stops.iter().map(|s| s.node).collect()
    }

    /// Index of the first stop at `node`.
    pub fn position_of(&self, node: Node) -> Option<usize> {
        self.stops.iter().position(|s| s.node == node)
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stop) in self.stops.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{stop}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tour_empty() {
        let t = Tour::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert_eq!(t.position_of(Node::Start), None);
    }

    #[test]
    fn test_tour_push() {
        let mut t = Tour::new();
        t.push(TourStop::start());
        t.push(TourStop::new(Node::Item(1), Some(Direction::North)));
        assert_eq!(t.len(), 2);
        assert_eq!(t.position_of(Node::Item(1)), Some(1));
        assert_eq!(t.stops()[1].side, Some(Direction::North));
    }
}
