//! Test helpers para lumen-analytics.

#![allow(dead_code, unused_imports)]

pub mod executors;
pub mod fixtures;

pub use executors::{FailingExecutor, FlakyExecutor};
pub use fixtures::*;
