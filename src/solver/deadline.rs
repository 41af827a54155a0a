//! Cooperative wall-clock deadline.

use std::time::{Duration, Instant};

use crate::error::{PickingError, PickingResult};

/// A start instant plus a time budget, polled by the solvers.
///
/// A zero budget is expired from the start.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_picking::solver::Deadline;
///
/// assert!(Deadline::after(Duration::ZERO).is_expired());
/// assert!(!Deadline::unbounded().is_expired());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts a deadline of `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self::after(Duration::MAX)
    }

    /// A fresh deadline with the same budget, starting now.
    pub fn restarted(&self) -> Self {
        Self::after(self.budget)
    }

    /// The time budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time elapsed since the deadline started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// Returns `true` once the budget has been used up.
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.budget
    }

    /// Fails with [`PickingError::DeadlineExceeded`] once expired.
    pub fn check(&self) -> PickingResult<()> {
        if self.is_expired() {
            Err(PickingError::DeadlineExceeded(self.budget))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert!(matches!(
            deadline.check(),
            Err(PickingError::DeadlineExceeded(d)) if d == Duration::ZERO
        ));
    }

    #[test]
    fn test_unbounded() {
        let deadline = Deadline::unbounded();
        assert!(deadline.check().is_ok());
        assert!(deadline.remaining() > Duration::from_secs(3600));
    }

    #[test]
    fn test_restarted_keeps_budget() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let fresh = deadline.restarted();
        assert_eq!(fresh.budget(), Duration::from_secs(5));
        assert!(!fresh.is_expired());
    }
}
