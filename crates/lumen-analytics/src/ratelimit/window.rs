//! Sliding-window timestamp log.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Admitted request instants, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    timestamps: VecDeque<Instant>,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an admitted request.
    pub fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    /// Drops timestamps at least `horizon` old. Returns how many were dropped.
    pub fn prune(&mut self, now: Instant, horizon: Duration) -> usize {
        let start = self.window_start(now, horizon);
        self.timestamps.drain(..start);
        start
    }

    /// Counts timestamps younger than `horizon`.
    pub fn count_within(&self, now: Instant, horizon: Duration) -> usize {
        self.timestamps.len() - self.window_start(now, horizon)
    }

    /// Time until the window holds fewer than `ceiling` timestamps.
    ///
    /// Zero when it already does.
    pub fn retry_after(&self, now: Instant, horizon: Duration, ceiling: usize) -> Duration {
        let len = self.timestamps.len();
        if ceiling == 0 || self.count_within(now, horizon) < ceiling {
            return Duration::ZERO;
        }

        let blocking = self.timestamps[len - ceiling];
        horizon.saturating_sub(now.duration_since(blocking))
    }

    /// Total retained timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    fn window_start(&self, now: Instant, horizon: Duration) -> usize {
        self.timestamps
            .partition_point(|t| now.saturating_duration_since(*t) >= horizon)
    }
}
