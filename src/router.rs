//! Route computation entry point.
//!
//! [`Router`] validates an order, builds the access graph, runs the chosen
//! solver under the configured time budget and assembles the instructions.
//! Solver failures never reach the caller: the router falls back from the
//! primary solver to the localized heuristic and finally to the input
//! order, recording the reason on the report.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::assembly::{resolve, rotate, to_instructions, Instruction};
use crate::config::{RouterConfig, SolverKind};
use crate::error::{PickingError, PickingResult};
use crate::graph::AccessGraph;
use crate::models::{Cost, ItemId, Node, Order, Tour, Warehouse};
use crate::solver::{input_order_tour, solver_for, Deadline, TourSolution};

/// Why a report does not carry the primary solver's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Degradation {
    /// The time budget ran out.
    DeadlineExceeded,
    /// A node cannot be reached or left.
    IncompleteGraph(Node),
    /// The search space holds no complete tour.
    NoFeasibleTour,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
            Self::IncompleteGraph(node) => write!(f, "{node} is unreachable"),
            Self::NoFeasibleTour => f.write_str("no feasible tour"),
        }
    }
}

impl Degradation {
    fn from_error(err: &PickingError) -> Self {
        match err {
            PickingError::DeadlineExceeded(_) => Self::DeadlineExceeded,
            PickingError::IncompleteGraph(node) => Self::IncompleteGraph(*node),
            _ => Self::NoFeasibleTour,
        }
    }
}

/// Outcome of one route computation.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    /// Total steps, `None` if some stop could not be reached.
    pub cost: Option<Cost>,
    /// Visiting order, beginning at `Start`.
    pub tour: Tour,
    /// Worker instructions; stops that cannot be reached are left out.
    pub instructions: Vec<Instruction>,
    /// Wall-clock time from the access-graph build to the last instruction.
    pub elapsed: Duration,
    /// `true` if any solver hit the deadline.
    pub timed_out: bool,
    /// Solver that produced the tour (the primary one for input-order fallbacks).
    pub strategy: SolverKind,
    /// Set when the primary solver's answer is missing or partial.
    pub degradation: Option<Degradation>,
}

impl RouteReport {
    /// Returns `true` if the report carries a fallback or partial answer.
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Instructions rendered as text lines.
    pub fn instruction_lines(&self) -> Vec<String> {
        self.instructions.iter().map(ToString::to_string).collect()
    }

    /// Serializes the report to pretty JSON.
    pub fn to_json(&self) -> PickingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Computes picking routes with a fixed configuration.
///
/// # Examples
///
/// ```
/// use u_picking::config::RouterConfig;
/// use u_picking::models::{Position, Warehouse};
/// use u_picking::router::Router;
///
/// let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0)).unwrap();
/// wh.add_product(1, Position::new(2, 1)).unwrap();
/// wh.add_product(2, Position::new(4, 1)).unwrap();
///
/// let router = Router::new(RouterConfig::default()).unwrap();
/// let report = router.compute_route(&wh, &[1, 2]).unwrap();
/// assert_eq!(report.cost, Some(8));
/// assert!(!report.is_degraded());
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    /// Creates a router after validating `config`.
    pub fn new(config: RouterConfig) -> PickingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Validates `items` and computes a route through them.
    ///
    /// # Errors
    ///
    /// Only order validation errors ([`PickingError::DuplicateItem`],
    /// [`PickingError::UnknownItem`]); solver failures degrade the report.
    pub fn compute_route(&self, warehouse: &Warehouse, items: &[ItemId]) -> PickingResult<RouteReport> {
        let order = if self.config.group_shared_shelves {
            Order::grouped(warehouse, items)?
        } else {
            Order::new(warehouse, items)?
        };
        Ok(self.compute_route_for(warehouse, &order))
    }

    /// Route from `Start` to a single item and on to `End`.
    ///
    /// Uses the localized heuristic regardless of the configured strategy.
    pub fn route_to_item(&self, warehouse: &Warehouse, item: ItemId) -> PickingResult<RouteReport> {
        let order = Order::new(warehouse, &[item])?;
        Ok(self.run(warehouse, &order, SolverKind::LocalizedMinPath))
    }

    /// Computes a route for an already validated order.
    pub fn compute_route_for(&self, warehouse: &Warehouse, order: &Order) -> RouteReport {
        let kind = self.config.resolve(order.num_items());
        self.run(warehouse, order, kind)
    }

    fn run(&self, warehouse: &Warehouse, order: &Order, kind: SolverKind) -> RouteReport {
        info!(items = order.num_items(), strategy = %kind, "Computing route");
        let started = Instant::now();
        let graph = AccessGraph::build(warehouse, order);

        let deadline = Deadline::after(self.config.time_budget);
        let primary = graph
            .check_connected()
            .and_then(|()| solver_for(kind, self.config.access_type).solve(&graph, &deadline));

        let (solution, strategy, degradation, timed_out) = match primary {
            Ok(solution) => {
                let degradation = solution.timed_out.then_some(Degradation::DeadlineExceeded);
                let timed_out = solution.timed_out;
                (Some(solution), kind, degradation, timed_out)
            }
            Err(err) => {
                warn!(strategy = %kind, error = %err, "Primary solver failed");
                let timed_out = matches!(err, PickingError::DeadlineExceeded(_));
                let degradation = Some(Degradation::from_error(&err));
                match self.fallback(&graph, &deadline, kind, timed_out) {
                    Some((solution, fallback_kind)) => {
                        let timed_out = timed_out || solution.timed_out;
                        (Some(solution), fallback_kind, degradation, timed_out)
                    }
                    None => (None, kind, degradation, timed_out),
                }
            }
        };

        let (cost, tour) = match solution {
            Some(solution) => (Some(solution.cost), rotate(&solution.tour)),
            None => {
                warn!(strategy = %kind, "Falling back to input order");
                let (tour, cost) = input_order_tour(&graph);
                (cost, rotate(&tour))
            }
        };

        let instructions = match resolve(&graph, &tour) {
            Ok(path) => to_instructions(&path, &graph.item_positions()),
            Err(err) => {
                warn!(error = %err, "Tour could not be resolved into a path");
                Vec::new()
            }
        };

        let elapsed = started.elapsed();
        info!(
            cost = ?cost,
            strategy = %strategy,
            elapsed_ms = elapsed.as_millis() as u64,
            timed_out,
            degraded = degradation.is_some(),
            "Route computed"
        );

        RouteReport {
            cost,
            tour,
            instructions,
            elapsed,
            timed_out,
            strategy,
            degradation,
        }
    }

    /// Runs the localized heuristic after a primary timeout.
    fn fallback(
        &self,
        graph: &AccessGraph,
        deadline: &Deadline,
        primary: SolverKind,
        timed_out: bool,
    ) -> Option<(TourSolution, SolverKind)> {
        if !timed_out
            || !self.config.fallback_to_localized
            || primary == SolverKind::LocalizedMinPath
            || deadline.budget().is_zero()
        {
            return None;
        }

        let kind = SolverKind::LocalizedMinPath;
        match solver_for(kind, self.config.access_type).solve(graph, &deadline.restarted()) {
            Ok(solution) => Some((solution, kind)),
            Err(err) => {
                warn!(error = %err, "Localized fallback failed");
                None
            }
        }
    }
}
