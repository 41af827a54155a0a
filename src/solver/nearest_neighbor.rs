//! Repetitive nearest-neighbor tour heuristic.
//!
//! Every reachable approach of every edge is tried as the opening move.
//! From there the walk greedily takes the cheapest edge to an unvisited
//! node, falling back to a visited node when stuck, and finally returns to
//! the stop it opened from. The cheapest closed walk wins.
//!
//! # Complexity
//!
//! O(E · n · d) where E = number of edges, n = number of nodes and
//! d = out-degree of a stop.

use tracing::{debug, warn};

use crate::error::{PickingError, PickingResult};
use crate::graph::{AccessGraph, EdgeKey};
use crate::models::{add_cost, Cost, Direction};

use super::{Deadline, SearchStats, TourSolution, TourSolver};

type Stop = (usize, Option<Direction>);

/// Repetitive nearest neighbor.
///
/// Ties go to the lower destination node index, then to the side order
/// North, South, East, West.
///
/// # Examples
///
/// ```
/// use u_picking::graph::AccessGraph;
/// use u_picking::models::{Node, Order, Position, Warehouse};
/// use u_picking::solver::{Deadline, NearestNeighbor, TourSolver};
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 1)).unwrap();
/// wh.add_product(2, Position::new(4, 1)).unwrap();
/// let order = Order::new(&wh, &[1, 2]).unwrap();
/// let graph = AccessGraph::build(&wh, &order);
///
/// let solution = NearestNeighbor::new().solve(&graph, &Deadline::unbounded()).unwrap();
/// assert_eq!(solution.cost, 8);
/// assert_eq!(solution.tour.stops()[0].node, Node::Start);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl NearestNeighbor {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl TourSolver for NearestNeighbor {
    fn name(&self) -> &'static str {
        "nearest-neighbor"
    }

    fn solve(&self, graph: &AccessGraph, deadline: &Deadline) -> PickingResult<TourSolution> {
        let mut stats = SearchStats::default();
        let mut best: Option<(Cost, Vec<Stop>)> = None;
        let mut timed_out = false;

        'edges: for edge in graph.edges() {
            if deadline.is_expired() {
                timed_out = true;
                break 'edges;
            }

            for approach in &edge.approaches {
                let Some(opening) = approach.cost else {
                    continue;
                };
                stats.explored += 1;

                let first = (edge.key.source, edge.key.side);
                let second = (edge.key.dest, approach.side);
                let Some((cost, stops)) = walk(graph, first, second, opening) else {
                    stats.pruned += 1;
                    continue;
                };

                if best.as_ref().map_or(true, |(b, _)| cost < *b) {
                    debug!(cost, explored = stats.explored, "New incumbent tour");
                    stats.solutions += 1;
                    best = Some((cost, stops));
                } else {
                    stats.pruned += 1;
                }
            }
        }

        debug!(
            explored = stats.explored,
            pruned = stats.pruned,
            solutions = stats.solutions,
            "Nearest neighbor finished"
        );

        let Some((cost, mut stops)) = best else {
            if timed_out {
                warn!(budget = ?deadline.budget(), "Nearest neighbor timed out without a tour");
                return Err(PickingError::DeadlineExceeded(deadline.budget()));
            }
            return Err(PickingError::NoFeasibleTour);
        };
        if timed_out {
            warn!(cost, "Nearest neighbor timed out, returning incumbent");
        }

        let start = graph.start_index();
        if let Some(pos) = stops.iter().position(|&(node, _)| node == start) {
            stops.rotate_left(pos);
        }

        Ok(TourSolution {
            cost,
            tour: graph.tour_from(&stops),
            timed_out,
            stats,
        })
    }
}

/// Walks greedily from the opening move and closes back to `first`.
///
/// Returns `None` if the walk gets stuck or cannot close.
fn walk(graph: &AccessGraph, first: Stop, second: Stop, opening: Cost) -> Option<(Cost, Vec<Stop>)> {
    let n = graph.num_nodes();
    let mut visited = vec![false; n];
    let mut revisited = vec![false; n];
    visited[first.0] = true;
    visited[second.0] = true;
    let mut remaining = n - 2;

    let mut stops = vec![first, second];
    let mut cost = opening;
    let mut current = second;

    while remaining > 0 {
        let next = cheapest_move(graph, current, |dest| !visited[dest]).or_else(|| {
            cheapest_move(graph, current, |dest| {
                dest != first.0 && visited[dest] && !revisited[dest]
            })
        });
        let (stop, c) = next?;

        if visited[stop.0] {
            revisited[stop.0] = true;
        } else {
            visited[stop.0] = true;
            remaining -= 1;
        }
        cost = add_cost(cost, c);
        stops.push(stop);
        current = stop;
    }

    let closing = graph
        .find(EdgeKey {
            source: current.0,
            dest: first.0,
            side: current.1,
        })?
        .approach(first.1)?
        .cost?;

    Some((add_cost(cost, closing), stops))
}

/// Cheapest reachable stop among destinations accepted by `allow`.
fn cheapest_move<F>(graph: &AccessGraph, from: Stop, allow: F) -> Option<(Stop, Cost)>
where
    F: Fn(usize) -> bool,
{
    let mut best: Option<(Stop, Cost)> = None;
    for e in graph.edges_from_stop(from.0, from.1) {
        let edge = graph.edge(e);
        let dest = edge.key.dest;
        if !allow(dest) {
            continue;
        }
        for approach in &edge.approaches {
            let Some(c) = approach.cost else {
                continue;
            };
            if best.map_or(true, |(_, b)| c < b) {
                best = Some(((dest, approach.side), c));
            }
        }
    }
    best
}
