//! Access graph between the approach points of every node pair.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::assembly::collapse_directions;
use crate::error::{PickingError, PickingResult};
use crate::models::{Cost, Direction, Grid, Node, Order, Position, Tour, TourStop, Warehouse};
use crate::pathfinding::shortest_path;

/// Identifies an edge: from `source` (departing at `side`) to `dest`.
///
/// Node fields are indices into [`AccessGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub source: usize,
    pub dest: usize,
    pub side: Option<Direction>,
}

/// One destination approach of an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approach {
    /// Approach side at the destination (`None` for `End` and `Start`).
    pub side: Option<Direction>,
    /// Approach cell, `None` if it is out of bounds or a shelf.
    pub target: Option<Position>,
    /// Path cost, `None` if unreachable.
    pub cost: Option<Cost>,
    /// Collapsed path (turning points only); empty when unreachable.
    pub path: Vec<Position>,
}

/// All destination approaches reachable from one source stop to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub key: EdgeKey,
    /// At most four entries, in [`Direction::ALL`] order.
    pub approaches: Vec<Approach>,
}

impl Edge {
    /// Slot index of the approach at `side`.
    pub fn slot_of(&self, side: Option<Direction>) -> Option<usize> {
        self.approaches.iter().position(|a| a.side == side)
    }

    /// Approach at `side`.
    pub fn approach(&self, side: Option<Direction>) -> Option<&Approach> {
        self.approaches.iter().find(|a| a.side == side)
    }

    /// Returns `true` if at least one approach is reachable.
    pub fn is_reachable(&self) -> bool {
        self.approaches.iter().any(|a| a.cost.is_some())
    }
}

/// Precomputed shortest paths between the approach points of every
/// ordered pair of nodes in an order.
///
/// Node index 0 is always `Start` and the last index is always `End`.
/// The graph also holds a zero-cost `(End, Start, None)` edge closing the
/// tour loop.
///
/// # Examples
///
/// ```
/// use u_picking::graph::{AccessGraph, EdgeKey};
/// use u_picking::models::{Direction, Order, Position, Warehouse};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 1)).unwrap();
/// let order = Order::new(&wh, &[1]).unwrap();
///
/// let graph = AccessGraph::build(&wh, &order);
/// let edge = graph.find(EdgeKey { source: 0, dest: 1, side: None }).unwrap();
/// let south = edge.approach(Some(Direction::South)).unwrap();
/// assert_eq!(south.target, Some(Position::new(2, 0)));
/// assert_eq!(south.cost, Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct AccessGraph {
    nodes: Vec<Node>,
    positions: Vec<Position>,
    edges: Vec<Edge>,
    index: HashMap<EdgeKey, usize>,
    by_source: Vec<Vec<usize>>,
    by_dest: Vec<Vec<usize>>,
}

impl AccessGraph {
    /// Builds the access graph of `order` on the warehouse floor.
    ///
    /// Runs one grid search per valid (source side, destination side)
    /// combination, O(nodes² × 16) searches in total.
    pub fn build(warehouse: &Warehouse, order: &Order) -> Self {
        let started = Instant::now();
        let nodes = order.nodes().to_vec();
        let positions: Vec<Position> = nodes
            .iter()
            .map(|&node| match node {
                Node::Start => warehouse.start(),
                Node::End => warehouse.end(),
                // Order validation guarantees catalog membership.
                Node::Item(id) => warehouse.product_position(id).unwrap_or(warehouse.start()),
            })
            .collect();

        let mut graph = Self {
            by_source: vec![Vec::new(); nodes.len()],
            by_dest: vec![Vec::new(); nodes.len()],
            nodes,
            positions,
            edges: Vec::new(),
            index: HashMap::new(),
        };

        let n = graph.nodes.len();
        let start = graph.start_index();
        let end = graph.end_index();
        let has_items = n > 2;
        let grid = warehouse.grid();

        for source in 0..n {
            for dest in 0..n {
                if source == dest || source == end || dest == start {
                    continue;
                }
                if source == start && dest == end && has_items {
                    continue;
                }

                for side in graph.sides(source) {
                    let Some(from) = graph.approach_cell(grid, source, side) else {
                        debug!(node = %graph.nodes[source], ?side, "skipping blocked source side");
                        continue;
                    };

                    let approaches: Vec<Approach> = graph
                        .sides(dest)
                        .into_iter()
                        .map(|dest_side| {
                            let target = graph.approach_cell(grid, dest, dest_side);
                            let found = target.and_then(|t| shortest_path(grid, from, t));
                            Approach {
                                side: dest_side,
                                target,
                                cost: found.as_ref().map(|p| p.cost),
                                path: found
                                    .map(|p| collapse_directions(&p.cells))
                                    .unwrap_or_default(),
                            }
                        })
                        .collect();

                    let edge = Edge {
                        key: EdgeKey { source, dest, side },
                        approaches,
                    };
                    if edge.is_reachable() {
                        graph.insert(edge);
                    }
                }
            }
        }

        let start_position = graph.positions[start];
        graph.insert(Edge {
            key: EdgeKey {
                source: end,
                dest: start,
                side: None,
            },
            approaches: vec![Approach {
                side: None,
                target: Some(start_position),
                cost: Some(0),
                path: Vec::new(),
            }],
        });

        info!(
            nodes = n,
            edges = graph.edges.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built access graph"
        );
        graph
    }

    fn insert(&mut self, edge: Edge) {
        let idx = self.edges.len();
        self.by_source[edge.key.source].push(idx);
        self.by_dest[edge.key.dest].push(idx);
        self.index.insert(edge.key, idx);
        self.edges.push(edge);
    }

    /// Graph over explicit edges, with no `End` to `Start` edge added.
    #[cfg(test)]
    pub(crate) fn from_edges(nodes: Vec<Node>, positions: Vec<Position>, edges: Vec<Edge>) -> Self {
        let n = nodes.len();
        let mut graph = Self {
            by_source: vec![Vec::new(); n],
            by_dest: vec![Vec::new(); n],
            nodes,
            positions,
            edges: Vec::new(),
            index: HashMap::new(),
        };
        for edge in edges {
            graph.insert(edge);
        }
        graph
    }

    /// Candidate approach sides of a node: none for the terminals, four for items.
    fn sides(&self, node: usize) -> Vec<Option<Direction>> {
        if self.nodes[node].is_terminal() {
            vec![None]
        } else {
            Direction::ALL.into_iter().map(Some).collect()
        }
    }

    /// Walkable approach cell of `node` at `side`.
    fn approach_cell(
        &self,
        grid: &Grid,
        node: usize,
        side: Option<Direction>,
    ) -> Option<Position> {
        let base = self.positions[node];
        let cell = match side {
            Some(direction) => base.step(direction),
            None => base,
        };
        grid.is_passable(cell).then_some(cell)
    }

    /// Nodes of the order, `Start` first and `End` last.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`.
    pub fn node(&self, index: usize) -> Node {
        self.nodes[index]
    }

    /// Number of nodes including `Start` and `End`.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Index of `node`, if it belongs to the order.
    pub fn node_index(&self, node: Node) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Index of the `Start` node.
    pub fn start_index(&self) -> usize {
        0
    }

    /// Index of the `End` node.
    pub fn end_index(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Floor position of a node (shelf cell for items).
    pub fn position(&self, index: usize) -> Position {
        self.positions[index]
    }

    /// Shelf positions of all items, without duplicates.
    pub fn item_positions(&self) -> Vec<Position> {
        let mut out: Vec<Position> = Vec::new();
        for (node, &p) in self.nodes.iter().zip(&self.positions) {
            if !node.is_terminal() && !out.contains(&p) {
                out.push(p);
            }
        }
        out
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge at `index`.
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Number of edges, including the loop-closing edge.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Index of the edge with `key`.
    pub fn edge_index(&self, key: EdgeKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Edge with `key`.
    pub fn find(&self, key: EdgeKey) -> Option<&Edge> {
        self.edge_index(key).map(|i| &self.edges[i])
    }

    /// Edges leaving `node`, from any side.
    pub fn edges_from(&self, node: usize) -> &[usize] {
        &self.by_source[node]
    }

    /// Edges entering `node`.
    pub fn edges_into(&self, node: usize) -> &[usize] {
        &self.by_dest[node]
    }

    /// Edges leaving `node` at `side`, in destination order.
    pub fn edges_from_stop(
        &self,
        node: usize,
        side: Option<Direction>,
    ) -> impl Iterator<Item = usize> + '_ {
        self.by_source[node]
            .iter()
            .copied()
            .filter(move |&e| self.edges[e].key.side == side)
    }

    /// Checks that every node can be both entered and left.
    ///
    /// Returns [`PickingError::IncompleteGraph`] for the first node (items
    /// before terminals) lacking a reachable incoming or outgoing edge.
    pub fn check_connected(&self) -> PickingResult<()> {
        let start = self.start_index();
        let end = self.end_index();
        let reachable = |edges: &[usize]| edges.iter().any(|&e| self.edges[e].is_reachable());

        let items = 1..end;
        for node in items.chain([start, end]) {
            let entered = node == start || reachable(&self.by_dest[node]);
            let left = node == end || reachable(&self.by_source[node]);
            if !entered || !left {
                return Err(PickingError::IncompleteGraph(self.nodes[node]));
            }
        }
        Ok(())
    }

    /// Converts index-based stops into a [`Tour`].
    pub fn tour_from(&self, stops: &[(usize, Option<Direction>)]) -> Tour {
        Tour::from_stops(
            stops
                .iter()
                .map(|&(node, side)| TourStop::new(self.nodes[node], side))
                .collect(),
        )
    }
}
