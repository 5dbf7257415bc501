//! Sweep state tracking.

use std::time::Instant;

use parking_lot::RwLock;

/// Tracks the runs of a background sweep.
#[derive(Debug)]
pub struct SweepState {
    /// Number of completed sweeps.
    runs: RwLock<u64>,
    /// Items removed across all sweeps.
    removed_total: RwLock<u64>,
    /// Items removed by the last sweep.
    last_removed: RwLock<usize>,
    /// When the last sweep finished.
    last_run: RwLock<Option<Instant>>,
}

impl SweepState {
    /// Creates a new SweepState.
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(0),
            removed_total: RwLock::new(0),
            last_removed: RwLock::new(0),
            last_run: RwLock::new(None),
        }
    }

    /// Records a completed sweep.
    pub fn record_run(&self, removed: usize) {
        let mut runs = self.runs.write();
        let mut removed_total = self.removed_total.write();
        let mut last_removed = self.last_removed.write();
        let mut last_run = self.last_run.write();

        *runs += 1;
        *removed_total += removed as u64;
        *last_removed = removed;
        *last_run = Some(Instant::now());
    }

    /// Returns the number of completed sweeps.
    pub fn runs(&self) -> u64 {
        *self.runs.read()
    }

    /// Returns the number of items removed across all sweeps.
    pub fn removed_total(&self) -> u64 {
        *self.removed_total.read()
    }

    /// Returns the number of items removed by the last sweep.
    pub fn last_removed(&self) -> usize {
        *self.last_removed.read()
    }

    /// Returns when the last sweep finished.
    pub fn last_run(&self) -> Option<Instant> {
        *self.last_run.read()
    }

    /// Resets all counters.
    pub fn reset(&self) {
        let mut runs = self.runs.write();
        let mut removed_total = self.removed_total.write();
        let mut last_removed = self.last_removed.write();
        let mut last_run = self.last_run.write();

        *runs = 0;
        *removed_total = 0;
        *last_removed = 0;
        *last_run = None;
    }
}

impl Default for SweepState {
    fn default() -> Self {
        Self::new()
    }
}
