//! Tour construction strategies.
//!
//! - [`BranchAndBound`]: exact best-first search with matrix reduction
//! - [`NearestNeighbor`]: repetitive nearest-neighbor walk, O(E² · n)
//! - [`LocalizedMinPath`]: greedy threading of items sorted by distance from Start
//!
//! Every strategy polls a shared [`Deadline`] and returns a
//! [`TourSolution`] beginning at `Start` and ending at `End`.

mod branch_and_bound;
mod deadline;
mod localized;
mod nearest_neighbor;

pub use branch_and_bound::BranchAndBound;
pub use deadline::Deadline;
pub use localized::{input_order_tour, LocalizedMinPath};
pub use nearest_neighbor::NearestNeighbor;

use serde::Serialize;

use crate::config::{AccessType, SolverKind};
use crate::error::PickingResult;
use crate::graph::AccessGraph;
use crate::models::{Cost, Tour};

/// Counters collected during one solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// States popped (branch-and-bound) or walks started (nearest neighbor).
    pub explored: usize,
    /// States or walks discarded as not better than the incumbent.
    pub pruned: usize,
    /// Improving complete tours found.
    pub solutions: usize,
    /// Matrix reductions answered from the branch-and-bound memo.
    pub reused: usize,
}

/// A complete tour found by a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourSolution {
    /// Total step count.
    pub cost: Cost,
    /// Stops from `Start` to `End`.
    pub tour: Tour,
    /// `true` if the deadline cut the search short.
    pub timed_out: bool,
    pub stats: SearchStats,
}

/// A tour construction strategy.
pub trait TourSolver {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Finds a tour through every node of `graph`.
    ///
    /// # Errors
    ///
    /// [`DeadlineExceeded`](crate::error::PickingError::DeadlineExceeded)
    /// when the deadline expires before any tour is complete, plus
    /// strategy-specific failures.
    fn solve(&self, graph: &AccessGraph, deadline: &Deadline) -> PickingResult<TourSolution>;
}

/// Creates the solver for `kind`.
pub fn solver_for(kind: SolverKind, access_type: AccessType) -> Box<dyn TourSolver> {
    match kind {
        SolverKind::BranchAndBound => Box::new(BranchAndBound::new(access_type)),
        SolverKind::NearestNeighbor => Box::new(NearestNeighbor::new()),
        SolverKind::LocalizedMinPath => Box::new(LocalizedMinPath::new()),
    }
}
