//! Matrix reduction for branch-and-bound lower bounds.
//!
//! # Algorithm
//!
//! Every node except `End` is left exactly once in a tour and `End` is
//! entered exactly once. Subtracting the cheapest finite cost from every
//! group of edges sharing a source node, and then from the group of edges
//! entering `End`, therefore never overestimates the remaining tour cost.
//! Committing an edge rules out every other edge leaving its source or
//! entering its destination before the groups are reduced.

use super::{AccessGraph, CostMatrix, EdgeKey};
use crate::models::{add_cost, Cost};

/// An edge fixed into the partial tour, identified by its endpoint nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub source: usize,
    pub dest: usize,
}

impl Commit {
    /// Commit of the edge with `key`.
    pub fn of(key: EdgeKey) -> Self {
        Self {
            source: key.source,
            dest: key.dest,
        }
    }
}

/// Reduces `matrix` and returns the reduction cost with the reduced copy.
///
/// `matrix` itself is left untouched.
///
/// # Examples
///
/// ```
/// use u_picking::graph::{reduce, AccessGraph, CostMatrix};
/// use u_picking::models::{Order, Position, Warehouse};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 1)).unwrap();
/// let order = Order::new(&wh, &[1]).unwrap();
/// let graph = AccessGraph::build(&wh, &order);
///
/// let (bound, _) = reduce(&graph, &CostMatrix::from_graph(&graph), None);
/// // Start -> south of item 1 -> back: 2 + 2.
/// assert_eq!(bound, 4);
/// ```
pub fn reduce(
    graph: &AccessGraph,
    matrix: &CostMatrix,
    committed: Option<Commit>,
) -> (Cost, CostMatrix) {
    let mut reduced = matrix.clone();

    if let Some(commit) = committed {
        for &e in graph.edges_from(commit.source) {
            reduced.exclude(e);
        }
        for &e in graph.edges_into(commit.dest) {
            reduced.exclude(e);
        }
    }

    let mut cost: Cost = 0;
    for node in 0..graph.num_nodes() {
        cost = add_cost(cost, reduce_group(&mut reduced, graph.edges_from(node)));
    }
    cost = add_cost(
        cost,
        reduce_group(&mut reduced, graph.edges_into(graph.end_index())),
    );

    (cost, reduced)
}

fn reduce_group(matrix: &mut CostMatrix, edges: &[usize]) -> Cost {
    let Some(min) = edges
        .iter()
        .filter_map(|&e| matrix.min_finite(e).map(|(_, c)| c))
        .min()
    else {
        return 0;
    };
    if min > 0 {
        for &e in edges {
            matrix.subtract(e, min);
        }
    }
    min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, Order, Position, Warehouse, INFINITE_COST};

    fn line_graph() -> AccessGraph {
        let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0))
            .expect("valid");
        wh.add_product(1, Position::new(2, 1)).expect("free");
        wh.add_product(2, Position::new(4, 1)).expect("free");
        let order = Order::new(&wh, &[1, 2]).expect("valid");
        AccessGraph::build(&wh, &order)
    }

    fn group_min(m: &CostMatrix, edges: &[usize]) -> Option<Cost> {
        edges
            .iter()
            .filter_map(|&e| m.min_finite(e).map(|(_, c)| c))
            .min()
    }

    #[test]
    fn test_root_bound_does_not_exceed_optimum() {
        let graph = line_graph();
        let (bound, _) = reduce(&graph, &CostMatrix::from_graph(&graph), None);
        assert!(bound <= 8);
        assert!(bound > 0);
    }

    #[test]
    fn test_every_group_has_a_zero() {
        let graph = line_graph();
        let (_, m) = reduce(&graph, &CostMatrix::from_graph(&graph), None);
        for node in 0..graph.num_nodes() {
            if let Some(min) = group_min(&m, graph.edges_from(node)) {
                assert_eq!(min, 0, "row of node {node}");
            }
        }
        assert_eq!(group_min(&m, graph.edges_into(graph.end_index())), Some(0));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let graph = line_graph();
        let original = CostMatrix::from_graph(&graph);
        let copy = original.clone();
        let _ = reduce(&graph, &original, None);
        assert_eq!(original, copy);
    }

    #[test]
    fn test_commit_excludes_row_and_column() {
        let graph = line_graph();
        let key = EdgeKey {
            source: 1,
            dest: 2,
            side: Some(Direction::East),
        };
        assert!(graph.find(key).is_some());

        let (_, m) = reduce(
            &graph,
            &CostMatrix::from_graph(&graph),
            Some(Commit::of(key)),
        );
        for &e in graph.edges_from(1).iter().chain(graph.edges_into(2)) {
            assert_eq!(m.row(e), &[INFINITE_COST; 4]);
        }
        // Edges into End from item 2 survive.
        assert!(graph
            .edges_from(2)
            .iter()
            .any(|&e| m.min_finite(e).is_some()));
    }

    #[test]
    fn test_empty_groups_contribute_nothing() {
        let graph = line_graph();
        let mut m = CostMatrix::new(graph.num_edges());
        let end_start = graph
            .edge_index(EdgeKey {
                source: graph.end_index(),
                dest: 0,
                side: None,
            })
            .expect("closing edge");
        m.set(end_start, 0, 0);
        let (cost, _) = reduce(&graph, &m, None);
        assert_eq!(cost, 0);
    }
}
