//! Wall-clock budgets shared across oracle calls.

use std::time::{Duration, Instant};

/// A fixed point in time after which work should stop.
///
/// The remaining budget is recomputed on every query and never reset, so
/// a deadline can be threaded through a sequence of solves (the
/// refinement loop, or every probe of a bottleneck search).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_lazycut::Deadline;
///
/// assert_eq!(Deadline::unlimited().remaining(), None);
/// let d = Deadline::new(Some(Duration::ZERO));
/// assert!(d.is_expired());
/// assert_eq!(d.remaining(), Some(Duration::ZERO));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Starts a budget of `limit` now; `None` never expires.
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// A budget that never expires.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Time left, saturating at zero. `None` when unlimited.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    /// Whether the budget is used up.
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }

    /// Time since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unlimited()
    }
}
