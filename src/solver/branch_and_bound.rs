//! Exact tour search by best-first branch-and-bound.
//!
//! # Algorithm
//!
//! 1. Reduce the full cost matrix; the reduction cost is the root bound.
//! 2. Pop the state with the lowest bound. A state covering every node but
//!    `End` is closed through its edge into `End`.
//! 3. Otherwise branch on every unvisited destination reachable from the
//!    current stop. A child's bound is the parent bound plus the reduced
//!    edge cost plus the reduction after committing the edge.
//! 4. States whose bound exceeds the incumbent are pruned.
//!
//! A state's reduced matrix depends only on the node sequence of its partial
//! tour, so reductions are memoized by (node sequence, destination) and
//! shared by states that differ only in approach sides.
//!
//! On complete tours the bound equals the true tour cost, so the first
//! closed tour with the lowest bound is optimal.
//!
//! # Complexity
//!
//! Exponential in the number of items in the worst case; every branch
//! costs one O(E) reduction.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, warn};

use crate::config::AccessType;
use crate::error::{PickingError, PickingResult};
use crate::graph::{reduce, AccessGraph, Commit, CostMatrix, EdgeKey};
use crate::models::{add_cost, Cost, Direction, INFINITE_COST};

use super::{Deadline, SearchStats, TourSolution, TourSolver};

type Stop = (usize, Option<Direction>);

/// Best-first branch-and-bound over the access graph.
///
/// # Examples
///
/// ```
/// use u_picking::config::AccessType;
/// use u_picking::graph::AccessGraph;
/// use u_picking::models::{Order, Position, Warehouse};
/// use u_picking::solver::{BranchAndBound, Deadline, TourSolver};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 1)).unwrap();
/// wh.add_product(2, Position::new(4, 1)).unwrap();
/// let order = Order::new(&wh, &[1, 2]).unwrap();
/// let graph = AccessGraph::build(&wh, &order);
///
/// let solution = BranchAndBound::new(AccessType::Multi)
///     .solve(&graph, &Deadline::unbounded())
///     .unwrap();
/// assert_eq!(solution.cost, 8);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound {
    access_type: AccessType,
}

impl BranchAndBound {
    /// Creates a solver with the given access type.
    pub fn new(access_type: AccessType) -> Self {
        Self { access_type }
    }

    /// The access type in use.
    pub fn access_type(&self) -> AccessType {
        self.access_type
    }
}

/// A partial tour with its own reduced cost plane.
#[derive(Debug, Clone)]
struct SearchState {
    node: usize,
    side: Option<Direction>,
    bound: Cost,
    matrix: CostMatrix,
    tour: Vec<Stop>,
    visited: Vec<bool>,
}

impl SearchState {
    fn child(&self, dest: usize, side: Option<Direction>, bound: Cost, matrix: CostMatrix) -> Self {
        let mut tour = Vec::with_capacity(self.tour.len() + 1);
        tour.extend_from_slice(&self.tour);
        tour.push((dest, side));
        let mut visited = self.visited.clone();
        visited[dest] = true;
        Self {
            node: dest,
            side,
            bound,
            matrix,
            tour,
            visited,
        }
    }
}

/// Heap entry: lowest bound first, then deeper, then earlier.
struct FrontierEntry {
    bound: Cost,
    depth: usize,
    seq: u64,
    state: SearchState,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .cmp(&self.bound)
            .then_with(|| self.depth.cmp(&other.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    seq: u64,
}

impl Frontier {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    fn push(&mut self, state: SearchState) {
        self.heap.push(FrontierEntry {
            bound: state.bound,
            depth: state.tour.len(),
            seq: self.seq,
            state,
        });
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<SearchState> {
        self.heap.pop().map(|entry| entry.state)
    }
}

/// Memoized reductions keyed by (partial tour node sequence, destination).
#[derive(Default)]
struct ReductionCache {
    entries: HashMap<(Vec<usize>, usize), (Cost, CostMatrix)>,
}

impl ReductionCache {
    /// Reduces `state.matrix` committing the edge `key` out of `state`.
    fn reduce(
        &mut self,
        graph: &AccessGraph,
        state: &SearchState,
        key: EdgeKey,
        stats: &mut SearchStats,
    ) -> (Cost, CostMatrix) {
        let signature: (Vec<usize>, usize) =
            (state.tour.iter().map(|&(node, _)| node).collect(), key.dest);
        if let Some((r, matrix)) = self.entries.get(&signature) {
            stats.reused += 1;
            return (*r, matrix.clone());
        }
        let (r, matrix) = reduce(graph, &state.matrix, Some(Commit::of(key)));
        self.entries.insert(signature, (r, matrix.clone()));
        (r, matrix)
    }
}

impl TourSolver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn solve(&self, graph: &AccessGraph, deadline: &Deadline) -> PickingResult<TourSolution> {
        self.search(graph, deadline, |_| deadline.is_expired())
    }
}

impl BranchAndBound {
    /// Runs the search, stopping once `expired` returns `true`.
    fn search<F>(
        &self,
        graph: &AccessGraph,
        deadline: &Deadline,
        mut expired: F,
    ) -> PickingResult<TourSolution>
    where
        F: FnMut(&SearchStats) -> bool,
    {
        let n = graph.num_nodes();
        let start = graph.start_index();
        let end = graph.end_index();

        let (root_bound, root_matrix) = reduce(graph, &CostMatrix::from_graph(graph), None);
        debug!(root_bound, edges = graph.num_edges(), "Branch-and-bound root reduced");

        let mut visited = vec![false; n];
        visited[start] = true;
        let mut frontier = Frontier::new();
        frontier.push(SearchState {
            node: start,
            side: None,
            bound: root_bound,
            matrix: root_matrix,
            tour: vec![(start, None)],
            visited,
        });

        let mut stats = SearchStats::default();
        let mut cache = ReductionCache::default();
        let mut best: Option<(Cost, Vec<Stop>)> = None;
        let mut timed_out = false;

        while let Some(state) = frontier.pop() {
            if expired(&stats) {
                timed_out = true;
                break;
            }
            stats.explored += 1;

            let best_cost = best.as_ref().map_or(INFINITE_COST, |(c, _)| *c);
            if state.bound > best_cost {
                stats.pruned += 1;
                continue;
            }

            if state.tour.len() == n - 1 {
                let key = EdgeKey {
                    source: state.node,
                    dest: end,
                    side: state.side,
                };
                let Some(e) = graph.edge_index(key) else {
                    continue;
                };
                let closing = state.matrix.get(e, 0);
                if closing == INFINITE_COST {
                    continue;
                }
                let (r, _) = cache.reduce(graph, &state, key, &mut stats);
                let total = add_cost(add_cost(state.bound, closing), r);
                if total <= best_cost {
                    let mut tour = state.tour;
                    tour.push((end, None));
                    debug!(cost = total, explored = stats.explored, "New incumbent tour");
                    stats.solutions += 1;
                    best = Some((total, tour));
                }
                continue;
            }

            self.expand(graph, &state, best_cost, &mut cache, &mut frontier, &mut stats);
        }

        debug!(
            explored = stats.explored,
            pruned = stats.pruned,
            solutions = stats.solutions,
            reused = stats.reused,
            "Branch-and-bound finished"
        );

        match best {
            Some((cost, tour)) => {
                if timed_out {
                    warn!(cost, "Branch-and-bound timed out, returning incumbent");
                }
                Ok(TourSolution {
                    cost,
                    tour: graph.tour_from(&tour),
                    timed_out,
                    stats,
                })
            }
            None if timed_out => {
                warn!(budget = ?deadline.budget(), "Branch-and-bound timed out without a tour");
                Err(PickingError::DeadlineExceeded(deadline.budget()))
            }
            None => Err(PickingError::NoFeasibleTour),
        }
    }

    fn expand(
        &self,
        graph: &AccessGraph,
        state: &SearchState,
        best_cost: Cost,
        cache: &mut ReductionCache,
        frontier: &mut Frontier,
        stats: &mut SearchStats,
    ) {
        let end = graph.end_index();

        for e in graph.edges_from_stop(state.node, state.side) {
            let edge = graph.edge(e);
            let dest = edge.key.dest;
            if dest == end || state.visited[dest] {
                continue;
            }

            let finite: Vec<(Option<Direction>, Cost)> = edge
                .approaches
                .iter()
                .enumerate()
                .map(|(slot, a)| (a.side, state.matrix.get(e, slot)))
                .filter(|&(_, c)| c != INFINITE_COST)
                .collect();
            if finite.is_empty() {
                continue;
            }

            // One reduction per destination serves every approach side.
            let (r, reduced) = cache.reduce(graph, state, edge.key, stats);
            let totals = finite
                .into_iter()
                .map(|(side, c)| (side, add_cost(add_cost(state.bound, c), r)));

            match self.access_type {
                AccessType::Single => {
                    let mut cheapest: Option<(Option<Direction>, Cost)> = None;
                    for (side, total) in totals {
                        if cheapest.map_or(true, |(_, t)| total < t) {
                            cheapest = Some((side, total));
                        }
                    }
                    if let Some((side, total)) = cheapest {
                        if total <= best_cost {
                            frontier.push(state.child(dest, side, total, reduced));
                        } else {
                            stats.pruned += 1;
                        }
                    }
                }
                AccessType::Multi => {
                    for (side, total) in totals {
                        if total <= best_cost {
                            frontier.push(state.child(dest, side, total, reduced.clone()));
                        } else {
                            stats.pruned += 1;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{Node, Order, Position, Warehouse};

    fn line_graph() -> AccessGraph {
        let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0))
            .expect("valid");
        wh.add_product(1, Position::new(2, 1)).expect("free");
        wh.add_product(2, Position::new(4, 1)).expect("free");
        let order = Order::new(&wh, &[1, 2]).expect("valid");
        AccessGraph::build(&wh, &order)
    }

    #[test]
    fn test_line_scenario_cost() {
        let graph = line_graph();
        let solution = BranchAndBound::new(AccessType::Multi)
            .solve(&graph, &Deadline::unbounded())
            .expect("solvable");
        assert_eq!(solution.cost, 8);
        assert!(!solution.timed_out);

        let nodes = solution.tour.nodes();
        assert_eq!(nodes.first(), Some(&Node::Start));
        assert_eq!(nodes.last(), Some(&Node::End));
        assert_eq!(nodes.len(), 4);
        assert!(nodes.contains(&Node::Item(1)));
        assert!(nodes.contains(&Node::Item(2)));
    }

    #[test]
    fn test_single_access_not_better_than_multi() {
        let graph = line_graph();
        let multi = BranchAndBound::new(AccessType::Multi)
            .solve(&graph, &Deadline::unbounded())
            .expect("solvable");
        let single = BranchAndBound::new(AccessType::Single)
            .solve(&graph, &Deadline::unbounded())
            .expect("solvable");
        assert!(multi.cost <= single.cost);
    }

    #[test]
    fn test_empty_order() {
        let wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(3, 3)).expect("valid");
        let order = Order::new(&wh, &[]).expect("valid");
        let graph = AccessGraph::build(&wh, &order);
        let solution = BranchAndBound::default()
            .solve(&graph, &Deadline::unbounded())
            .expect("start to end");
        assert_eq!(solution.cost, 6);
        assert_eq!(solution.tour.nodes(), vec![Node::Start, Node::End]);
    }

    #[test]
    fn test_zero_budget() {
        let graph = line_graph();
        let result = BranchAndBound::default().solve(&graph, &Deadline::after(Duration::ZERO));
        assert!(matches!(result, Err(PickingError::DeadlineExceeded(_))));
    }

    #[test]
    fn test_unreachable_item_has_no_tour() {
        let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0))
            .expect("valid");
        wh.add_product(1, Position::new(2, 2)).expect("free");
        for p in [(2, 3), (2, 1), (3, 2), (1, 2)] {
            wh.add_obstacle(Position::from(p)).expect("free");
        }
        let order = Order::new(&wh, &[1]).expect("valid");
        let graph = AccessGraph::build(&wh, &order);
        let result = BranchAndBound::default().solve(&graph, &Deadline::unbounded());
        assert!(matches!(result, Err(PickingError::NoFeasibleTour)));
    }

    #[test]
    fn test_frontier_order() {
        let state = |bound, depth: usize| SearchState {
            node: 0,
            side: None,
            bound,
            matrix: CostMatrix::new(0),
            tour: vec![(0, None); depth],
            visited: Vec::new(),
        };
        let mut frontier = Frontier::new();
        frontier.push(state(5, 1));
        frontier.push(state(3, 1));
        frontier.push(state(3, 2));

        let first = frontier.pop().expect("entry");
        assert_eq!((first.bound, first.tour.len()), (3, 2));
        let second = frontier.pop().expect("entry");
        assert_eq!((second.bound, second.tour.len()), (3, 1));
        assert_eq!(frontier.pop().map(|s| s.bound), Some(5));
    }

    #[test]
    fn test_memoized_reduction_matches_fresh_one() {
        let graph = line_graph();
        let (bound, matrix) = reduce(&graph, &CostMatrix::from_graph(&graph), None);
        let root = SearchState {
            node: 0,
            side: None,
            bound,
            matrix,
            tour: vec![(0, None)],
            visited: vec![true, false, false, false],
        };
        let (r, reduced) = reduce(
            &graph,
            &root.matrix,
            Some(Commit { source: 0, dest: 1 }),
        );
        let north = root.child(1, Some(Direction::North), bound + r, reduced.clone());
        let west = root.child(1, Some(Direction::West), bound + r, reduced);

        let mut cache = ReductionCache::default();
        let mut stats = SearchStats::default();
        let via_north = EdgeKey {
            source: 1,
            dest: 2,
            side: Some(Direction::North),
        };
        let via_west = EdgeKey {
            side: Some(Direction::West),
            ..via_north
        };

        let first = cache.reduce(&graph, &north, via_north, &mut stats);
        assert_eq!(stats.reused, 0);
        let hit = cache.reduce(&graph, &west, via_west, &mut stats);
        assert_eq!(stats.reused, 1);

        let fresh = reduce(&graph, &west.matrix, Some(Commit::of(via_west)));
        assert_eq!(hit, fresh);
        assert_eq!(hit, first);
    }

    #[test]
    fn test_timeout_returns_incumbent() {
        let graph = line_graph();
        let solution = BranchAndBound::new(AccessType::Multi)
            .search(&graph, &Deadline::unbounded(), |stats| stats.solutions > 0)
            .expect("incumbent found before expiry");
        assert!(solution.timed_out);
        assert_eq!(solution.stats.solutions, 1);
        assert!(solution.cost >= 8);

        let nodes = solution.tour.nodes();
        assert_eq!(nodes.first(), Some(&Node::Start));
        assert_eq!(nodes.last(), Some(&Node::End));
        assert_eq!(nodes.len(), 4);
    }
}
