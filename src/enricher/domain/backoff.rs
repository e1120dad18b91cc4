//! Polling and start-gate scheduling parameters.

use std::time::Duration;

/// Adaptive interval between discovery cycles.
///
/// A productive cycle halves the interval, an idle one doubles it, always
/// staying within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBackoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl PollBackoff {
    /// Creates a backoff starting at `min`.
    ///
    /// A `max` below `min` is raised to `min`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            current: min,
        }
    }

    /// Returns the interval the next sleep would use.
    #[must_use]
    pub const fn current(&self) -> Duration {
        self.current
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Adapts the interval to the outcome of a cycle and returns it.
    pub fn record_cycle(&mut self, any_success: bool) -> Duration {
        self.current = if any_success {
            (self.current / 2).max(self.min)
        } else {
            self.current.saturating_mul(2).min(self.max)
        };
        self.current
    }
}

impl Default for PollBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

/// Bound on how long a task may wait for its start condition.
///
/// Once either limit is hit the task is marked failed as stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartGatePolicy {
    max_attempts: u32,
    deadline: Option<Duration>,
}

impl StartGatePolicy {
    /// Creates a policy checking the start condition at most `max_attempts`
    /// times (at least once) and giving up after `deadline` if set.
    #[must_use]
    pub fn new(max_attempts: u32, deadline: Option<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            deadline,
        }
    }

    /// Returns the maximum number of start checks.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the overall wait limit.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

impl Default for StartGatePolicy {
    fn default() -> Self {
        Self::new(30, None)
    }
}
