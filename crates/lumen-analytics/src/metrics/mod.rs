//! Metrics module for Lumen Analytics.

pub mod cache;
pub mod fetch;
pub mod setup;

pub use cache::CacheMetrics;
pub use fetch::{FetchMetrics, record_rate_limit_rejection};
pub use setup::{init_metrics, register_metrics};
