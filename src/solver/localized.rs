//! Localized minimum path heuristic and the input-order fallback.
//!
//! Items are sorted once by their cheapest approach from `Start`, then
//! threaded in that fixed order, taking the cheapest approach side at each
//! step given the side the worker currently stands at.
//!
//! # Complexity
//!
//! O(n log n) for the sort plus O(n) edge lookups.

use tracing::{debug, warn};

use crate::error::{PickingError, PickingResult};
use crate::graph::{AccessGraph, EdgeKey};
use crate::models::{add_cost, Cost, Direction, Tour, INFINITE_COST};

use super::{Deadline, SearchStats, TourSolution, TourSolver};

type Stop = (usize, Option<Direction>);

/// Greedy threading of items sorted by distance from `Start`.
///
/// # Examples
///
/// ```
/// use u_picking::graph::AccessGraph;
/// use u_picking::models::{Order, Position, Warehouse};
/// use u_picking::solver::{Deadline, LocalizedMinPath, TourSolver};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(4, 1)).unwrap();
/// wh.add_product(2, Position::new(2, 1)).unwrap();
/// let order = Order::new(&wh, &[1, 2]).unwrap();
/// let graph = AccessGraph::build(&wh, &order);
///
/// let solution = LocalizedMinPath::new().solve(&graph, &Deadline::unbounded()).unwrap();
/// assert_eq!(solution.cost, 8);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalizedMinPath;

impl LocalizedMinPath {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl TourSolver for LocalizedMinPath {
    fn name(&self) -> &'static str {
        "localized-min-path"
    }

    fn solve(&self, graph: &AccessGraph, deadline: &Deadline) -> PickingResult<TourSolution> {
        let start = graph.start_index();
        let end = graph.end_index();

        let mut items: Vec<usize> = (1..end).collect();
        items.sort_by_key(|&item| {
            cheapest_step(graph, (start, None), item).map_or(INFINITE_COST, |(_, c)| c)
        });
        items.push(end);

        let mut stats = SearchStats::default();
        let mut stops: Vec<Stop> = vec![(start, None)];
        let mut cost: Cost = 0;
        let mut current: Stop = (start, None);

        for dest in items {
            deadline.check().inspect_err(|_| {
                warn!(budget = ?deadline.budget(), "Localized min path timed out");
            })?;
            stats.explored += 1;

            let Some((side, c)) = cheapest_step(graph, current, dest) else {
                return Err(PickingError::IncompleteGraph(graph.node(dest)));
            };
            cost = add_cost(cost, c);
            current = (dest, side);
            stops.push(current);
        }

        stats.solutions = 1;
        debug!(cost, steps = stats.explored, "Localized min path finished");

        Ok(TourSolution {
            cost,
            tour: graph.tour_from(&stops),
            timed_out: false,
            stats,
        })
    }
}

/// Threads the graph's nodes in their given order.
///
/// Never fails: a stop that cannot be reached from the last reachable one is
/// left out of the tour and the returned cost becomes `None`. The remaining
/// stops still resolve into a walkable path.
pub fn input_order_tour(graph: &AccessGraph) -> (Tour, Option<Cost>) {
    let start = graph.start_index();
    let mut stops: Vec<Stop> = vec![(start, None)];
    let mut cost = Some(0);
    let mut current: Stop = (start, None);

    for dest in 1..graph.num_nodes() {
        match cheapest_step(graph, current, dest) {
            Some((side, c)) => {
                cost = cost.map(|total| add_cost(total, c));
                current = (dest, side);
                stops.push(current);
            }
            None => {
                debug!(node = %graph.node(dest), "Skipping unreachable stop");
                cost = None;
            }
        }
    }

    (graph.tour_from(&stops), cost)
}

/// Cheapest reachable approach of `dest` from stop `from`; lowest side wins ties.
fn cheapest_step(graph: &AccessGraph, from: Stop, dest: usize) -> Option<(Option<Direction>, Cost)> {
    let edge = graph.find(EdgeKey {
        source: from.0,
        dest,
        side: from.1,
    })?;
    edge.approaches
        .iter()
        .filter_map(|a| a.cost.map(|c| (a.side, c)))
        .min_by_key(|&(_, c)| c)
}
