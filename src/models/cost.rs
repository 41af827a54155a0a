//! Integer travel cost.

/// Travel cost in grid steps.
pub type Cost = u32;

/// Sentinel for an unreachable or excluded entry.
pub const INFINITE_COST: Cost = Cost::MAX;

/// Adds two costs, keeping [`INFINITE_COST`] absorbing.
///
/// # Examples
///
/// ```
/// use u_picking::models::{add_cost, INFINITE_COST};
///
/// assert_eq!(add_cost(3, 4), 7);
/// assert_eq!(add_cost(3, INFINITE_COST), INFINITE_COST);
/// ```
pub fn add_cost(a: Cost, b: Cost) -> Cost {
    a.saturating_add(b)
}
