//! Data fetcher for Lumen Analytics.
//!
//! Combines the permission oracle, the rate limiter, the TTL cache, the
//! validator and a query executor behind `fetch_data`, with request
//! coalescing, retries, pagination and aggregations on top.

pub mod aggregate;
pub mod data_fetcher;
pub mod dedup;
pub mod options;

// Re-exports
pub use aggregate::{AggregateResult, AggregateValue, Aggregation, UNKNOWN_GROUP};
pub use data_fetcher::{DataFetcher, FetcherStats};
pub use dedup::PendingRequests;
pub use options::{
    CachedPage, FetchOptions, FetchResult, FetcherConfig, PageOptions, PreAuthPolicy,
};
