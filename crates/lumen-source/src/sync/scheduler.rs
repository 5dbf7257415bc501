//! Background sweep scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use super::SweepState;

/// A maintenance task that can be run periodically.
pub trait Sweep: Send + Sync + 'static {
    /// Name used in logs.
    fn sweep_name(&self) -> &str;

    /// Runs one sweep and returns the number of items removed.
    fn sweep(&self) -> usize;
}

/// Configuration for a sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps. The first sweep runs one interval after start.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Handle for controlling a running sweep scheduler.
///
/// Dropping the handle stops the scheduler.
pub struct SweepHandle {
    /// Sender to signal shutdown.
    shutdown_tx: watch::Sender<bool>,
    /// Run statistics shared with the task.
    state: Arc<SweepState>,
}

impl SweepHandle {
    /// Signals the scheduler to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Returns true once stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Returns the run statistics.
    pub fn state(&self) -> &Arc<SweepState> {
        &self.state
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background scheduler running a [`Sweep`] on a fixed interval.
pub struct SweepScheduler<S: Sweep> {
    /// The sweep target.
    target: Arc<S>,
    /// Run statistics.
    state: Arc<SweepState>,
    /// Configuration.
    config: SweepConfig,
}

impl<S: Sweep> SweepScheduler<S> {
    /// Creates a new sweep scheduler.
    pub fn new(target: Arc<S>, config: SweepConfig) -> Self {
        Self {
            target,
            state: Arc::new(SweepState::new()),
            config,
        }
    }

    /// Creates a scheduler with the given interval.
    pub fn every(target: Arc<S>, interval: Duration) -> Self {
        Self::new(target, SweepConfig { interval })
    }

    /// Starts the background sweep task.
    ///
    /// Must be called from within a tokio runtime. Returns a handle that
    /// stops the task when dropped.
    pub fn start(self) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = SweepHandle {
            shutdown_tx,
            state: Arc::clone(&self.state),
        };

        tokio::spawn(self.run(shutdown_rx));

        handle
    }

    /// Runs the scheduler loop.
    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let period = self.config.interval;
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            sweep = self.target.sweep_name(),
            "Starting sweep scheduler with interval {:?}", period
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.run_once();
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!(sweep = self.target.sweep_name(), "Sweep scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Performs a single sweep.
    fn run_once(&self) {
        let removed = self.target.sweep();
        self.state.record_run(removed);
        debug!(
            sweep = self.target.sweep_name(),
            removed, "Sweep completed"
        );
    }
}
