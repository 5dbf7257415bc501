//! Cache module for Lumen Analytics.
//!
//! This module provides the in-memory TTL cache used for fetched pages,
//! deterministic key generation, pattern-based invalidation and a Moka
//! cache for aggregate results.

pub mod aggregate_cache;
pub mod invalidation;
pub mod keys;
pub mod ttl_cache;

// Re-exports
pub use aggregate_cache::AggregateCache;
pub use invalidation::InvalidationResult;
pub use keys::{KeyOptions, generate_key, resource_of, with_scope};
pub use ttl_cache::{CacheConfig, CacheEntry, CacheStats, DEFAULT_SIZE_ESTIMATE, MAX_TTL, TtlCache};
