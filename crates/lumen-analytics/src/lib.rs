//! # Lumen Analytics
//!
//! Cached, rate-limited and validated data access for analytics
//! dashboards and reports.
//!
//! ## Features
//!
//! - In-memory TTL cache with least-recently-accessed eviction
//! - Multi-tier sliding-window rate limiting (burst, per-minute, per-hour,
//!   per-resource)
//! - Request coalescing: one store query per cache key in flight
//! - Retries with linear back-off and query timeouts
//! - Cursor pagination and cached client-side aggregations
//! - Prometheus metrics and `LUMEN__*` settings
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use lumen_analytics::{AnalyticsService, Aggregation, FetchOptions, Settings};
//! use lumen_core::Filter;
//! use lumen_source::{MemoryStore, StaticPermissions};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! store.insert_json("events", json!([
//!     {"id": "e1", "kind": "click"},
//!     {"id": "e2", "kind": "view"},
//!     {"id": "e3", "kind": "click"},
//! ]))?;
//!
//! let service = AnalyticsService::new(
//!     Settings::default(),
//!     Arc::new(store),
//!     Arc::new(StaticPermissions::unauthenticated()),
//! )?;
//! let fetcher = service.fetcher();
//!
//! let clicks = fetcher
//!     .fetch_data("events", FetchOptions::new().filter(Filter::eq("kind", "click")))
//!     .await?;
//! assert_eq!(clicks.len(), 2);
//!
//! let totals = fetcher.fetch_aggregated("events", &[Aggregation::Count]).await?;
//! assert_eq!(totals.record_count, 3);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod ratelimit;
pub mod service;
pub mod settings;

// Re-exports
pub use cache::{CacheConfig, CacheStats, InvalidationResult, TtlCache, generate_key};
pub use error::FetchError;
pub use fetcher::{
    AggregateResult, AggregateValue, Aggregation, DataFetcher, FetchOptions, FetchResult,
    FetcherConfig, FetcherStats, PageOptions, PreAuthPolicy,
};
pub use ratelimit::{
    LimitedError, LimitedFn, RateLimitConfig, RateLimitDecision, RateLimitReason, RateLimitUpdate,
    RateLimiter,
};
pub use service::AnalyticsService;
pub use settings::Settings;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
