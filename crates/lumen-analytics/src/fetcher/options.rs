//! Fetch options, results and fetcher configuration.

use std::time::Duration;

use lumen_core::{ConfigError, Cursor, Filter, OrderBy, Record, Result};
use lumen_source::StoreQuery;
use serde::{Deserialize, Serialize};

use crate::cache::KeyOptions;

/// Options of a single [`fetch_data`](super::DataFetcher::fetch_data) call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// AND-combined predicates.
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
    /// Direction defaults to descending.
    pub order_by: Option<OrderBy>,
    pub start_after: Option<Cursor>,
    /// Read and populate the cache (default: true).
    pub use_cache: bool,
    /// Cache TTL; the cache default when `None`.
    pub ttl: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            limit: None,
            order_by: None,
            start_after: None,
            use_cache: true,
            ttl: None,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn start_after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.start_after = Some(cursor.into());
        self
    }

    pub fn maybe_start_after(mut self, cursor: Option<Cursor>) -> Self {
        self.start_after = cursor;
        self
    }

    /// Bypasses the cache for this call.
    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The part of the options that identifies a cached page.
    pub fn key_options(&self) -> KeyOptions {
        KeyOptions {
            limit: self.limit,
            order_by: self.order_by.clone(),
            start_after: self.start_after.clone(),
        }
    }

    /// Builds the store query for `resource`.
    pub fn to_query(&self, resource: &str) -> StoreQuery {
        StoreQuery::new(resource)
            .filters_from(self.filters.iter().cloned())
            .maybe_order_by(self.order_by.clone())
            .maybe_start_after(self.start_after.clone())
            .maybe_limit(self.limit)
    }

    /// True iff `returned` fills the requested limit.
    pub fn has_more(&self, returned: usize) -> bool {
        self.limit.is_some_and(|limit| returned == limit)
    }
}

/// Options of [`fetch_paginated`](super::DataFetcher::fetch_paginated).
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    pub page_size: usize,
    pub max_pages: usize,
    /// Filters, ordering and cache settings shared by every page.
    pub base: FetchOptions,
}

impl PageOptions {
    pub fn new(page_size: usize, max_pages: usize) -> Self {
        Self {
            page_size,
            max_pages,
            base: FetchOptions::default(),
        }
    }

    pub fn base(mut self, base: FetchOptions) -> Self {
        self.base = base;
        self
    }
}

/// A page as stored in the cache: sanitized records plus the resume cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedPage {
    pub records: Vec<Record>,
    pub cursor: Option<Cursor>,
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub data: Vec<Record>,
    pub from_cache: bool,
    /// True iff the returned count equals the requested limit.
    pub has_more: bool,
    /// Wall time of the execution; `None` for cache hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl FetchResult {
    /// Builds the result of a cache hit.
    pub fn from_cached(page: CachedPage, options: &FetchOptions) -> Self {
        Self {
            has_more: options.has_more(page.records.len()),
            data: page.records,
            from_cache: true,
            fetch_time_ms: None,
            cursor: page.cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What an unauthenticated caller may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreAuthPolicy {
    /// Reads proceed while no identity is established.
    #[default]
    AllowRead,
    /// Reads fail with access denied until a caller authenticates.
    Deny,
}

/// Fetcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Total execution attempts per fetch.
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `n * retry_delay`.
    pub retry_delay_ms: u64,
    pub query_timeout_ms: u64,
    /// TTL of cached aggregate results.
    pub aggregate_ttl_ms: u64,
    pub pre_auth_policy: PreAuthPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            query_timeout_ms: 30_000,
            aggregate_ttl_ms: 300_000,
            pre_auth_policy: PreAuthPolicy::AllowRead,
        }
    }
}

impl FetcherConfig {
    pub fn validate(&self) -> Result<()> {
        ConfigError::ensure_positive("fetcher.max_retries", u64::from(self.max_retries))?;
        ConfigError::ensure_positive("fetcher.query_timeout_ms", self.query_timeout_ms)?;
        ConfigError::ensure_positive("fetcher.aggregate_ttl_ms", self.aggregate_ttl_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn aggregate_ttl(&self) -> Duration {
        Duration::from_millis(self.aggregate_ttl_ms)
    }
}
