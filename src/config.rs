//! Router configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PickingError, PickingResult};

/// Tour construction strategy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Pick by order size (see [`RouterConfig::exact_item_limit`]).
    #[default]
    Auto,
    BranchAndBound,
    NearestNeighbor,
    LocalizedMinPath,
}

/// Concrete solver that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    BranchAndBound,
    NearestNeighbor,
    LocalizedMinPath,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BranchAndBound => "branch-and-bound",
            Self::NearestNeighbor => "nearest-neighbor",
            Self::LocalizedMinPath => "localized-min-path",
        })
    }
}

/// How many sides of a shelf branch-and-bound may approach from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessType {
    /// Only the cheapest side per destination is branched on.
    Single,
    /// Every reachable side is branched on.
    #[default]
    Multi,
}

/// Configuration for [`Router`](crate::router::Router).
///
/// Missing fields fall back to their defaults when deserialized.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_picking::config::{RouterConfig, Strategy};
///
/// let config = RouterConfig::default()
///     .with_strategy(Strategy::NearestNeighbor)
///     .with_time_budget(Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Strategy selector.
    pub strategy: Strategy,
    /// Access type used by branch-and-bound.
    pub access_type: AccessType,
    /// Wall-clock budget of the primary solver.
    pub time_budget: Duration,
    /// Largest order (in items) solved exactly under [`Strategy::Auto`].
    pub exact_item_limit: usize,
    /// Largest order solved by nearest neighbor under [`Strategy::Auto`].
    pub heuristic_item_limit: usize,
    /// Retry with the localized heuristic when the primary solver times out.
    pub fallback_to_localized: bool,
    /// Keep items sharing a shelf next to each other in the order.
    pub group_shared_shelves: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            access_type: AccessType::Multi,
            time_budget: Duration::from_secs(15),
            exact_item_limit: 8,
            heuristic_item_limit: 40,
            fallback_to_localized: true,
            group_shared_shelves: true,
        }
    }
}

impl RouterConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the access type.
    pub fn with_access_type(mut self, access_type: AccessType) -> Self {
        self.access_type = access_type;
        self
    }

    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the order size limits used by [`Strategy::Auto`].
    pub fn with_item_limits(mut self, exact: usize, heuristic: usize) -> Self {
        self.exact_item_limit = exact;
        self.heuristic_item_limit = heuristic;
        self
    }

    /// Enables or disables the localized fallback.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_localized = enabled;
        self
    }

    /// Enables or disables shared shelf grouping.
    pub fn with_group_shared_shelves(mut self, enabled: bool) -> Self {
        self.group_shared_shelves = enabled;
        self
    }

    /// Checks the configuration for inconsistent values.
    pub fn validate(&self) -> PickingResult<()> {
        if self.exact_item_limit > self.heuristic_item_limit {
            return Err(PickingError::InvalidConfig(format!(
                "exact_item_limit ({}) exceeds heuristic_item_limit ({})",
                self.exact_item_limit, self.heuristic_item_limit
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> PickingResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> PickingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the strategy for an order of `num_items` items.
    pub fn resolve(&self, num_items: usize) -> SolverKind {
        match self.strategy {
            Strategy::BranchAndBound => SolverKind::BranchAndBound,
            Strategy::NearestNeighbor => SolverKind::NearestNeighbor,
            Strategy::LocalizedMinPath => SolverKind::LocalizedMinPath,
            Strategy::Auto if num_items <= self.exact_item_limit => SolverKind::BranchAndBound,
            Strategy::Auto if num_items <= self.heuristic_item_limit => {
                SolverKind::NearestNeighbor
            }
            Strategy::Auto => SolverKind::LocalizedMinPath,
        }
    }
}
