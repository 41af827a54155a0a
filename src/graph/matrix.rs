//! Dense cost plane of an access graph.

use super::AccessGraph;
use crate::models::{Cost, INFINITE_COST};

/// Maximum number of destination approaches per edge.
pub const SLOTS: usize = 4;

/// One fixed-size row of approach costs per graph edge, in the same order
/// as [`AccessGraph::edges`].
///
/// Unreachable approaches and unused slots hold [`INFINITE_COST`]. This is
/// the only part of the graph that reduction rewrites, so search states can
/// own a copy without duplicating stored paths.
///
/// # Examples
///
/// ```
/// use u_picking::graph::CostMatrix;
/// use u_picking::models::INFINITE_COST;
///
/// let mut m = CostMatrix::new(2);
/// m.set(1, 0, 7);
/// assert_eq!(m.get(1, 0), 7);
/// assert_eq!(m.get(0, 0), INFINITE_COST);
/// assert_eq!(m.min_finite(1), Some((0, 7)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    rows: Vec<[Cost; SLOTS]>,
}

impl CostMatrix {
    /// Creates a matrix of `num_edges` rows, all infinite.
    pub fn new(num_edges: usize) -> Self {
        Self {
            rows: vec![[INFINITE_COST; SLOTS]; num_edges],
        }
    }

    /// Copies the approach costs out of an access graph.
    pub fn from_graph(graph: &AccessGraph) -> Self {
        let mut m = Self::new(graph.num_edges());
        for (row, edge) in m.rows.iter_mut().zip(graph.edges()) {
            for (slot, approach) in edge.approaches.iter().take(SLOTS).enumerate() {
                row[slot] = approach.cost.unwrap_or(INFINITE_COST);
            }
        }
        m
    }

    /// Cost of approach `slot` of edge `edge`.
    ///
    /// # Panics
    ///
    /// Panics if `edge` or `slot` is out of range.
    pub fn get(&self, edge: usize, slot: usize) -> Cost {
        self.rows[edge][slot]
    }

    /// Sets the cost of approach `slot` of edge `edge`.
    pub fn set(&mut self, edge: usize, slot: usize, cost: Cost) {
        self.rows[edge][slot] = cost;
    }

    /// All slot costs of an edge.
    pub fn row(&self, edge: usize) -> &[Cost; SLOTS] {
        &self.rows[edge]
    }

    /// Marks every approach of `edge` infinite.
    pub fn exclude(&mut self, edge: usize) {
        self.rows[edge] = [INFINITE_COST; SLOTS];
    }

    /// Cheapest finite slot of `edge` as `(slot, cost)`; lowest slot wins ties.
    pub fn min_finite(&self, edge: usize) -> Option<(usize, Cost)> {
        self.rows[edge]
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, c)| c != INFINITE_COST)
            .min_by_key(|&(_, c)| c)
    }

    /// Subtracts `amount` from every finite slot of `edge`.
    pub fn subtract(&mut self, edge: usize, amount: Cost) {
        for c in self.rows[edge].iter_mut() {
            if *c != INFINITE_COST {
                *c -= amount;
            }
        }
    }

    /// Number of edge rows.
    pub fn num_edges(&self) -> usize {
        self.rows.len()
    }
}
