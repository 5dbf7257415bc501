//! Background sweep scheduling.
//!
//! This module runs periodic maintenance (cache expiry, rate-limit window
//! pruning) on owned tasks that stop when their handle is dropped.

mod scheduler;
mod state;

pub use scheduler::{Sweep, SweepConfig, SweepHandle, SweepScheduler};
pub use state::SweepState;
