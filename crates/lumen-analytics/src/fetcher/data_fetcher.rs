//! Data fetcher: permission, rate limit, cache, coalescing and retry.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_core::{ConfigError, DataValidator, canonical_json};
use lumen_source::{AuthState, Identity, PermissionOracle, QueryExecutor};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::aggregate::{AggregateResult, Aggregation};
use super::dedup::PendingRequests;
use super::options::{CachedPage, FetchOptions, FetchResult, FetcherConfig, PageOptions, PreAuthPolicy};
use crate::cache::{
    AggregateCache, CacheStats, InvalidationResult, TtlCache, generate_key, with_scope,
};
use crate::error::FetchError;
use crate::metrics::FetchMetrics;
use crate::ratelimit::RateLimiter;

/// Snapshot returned by [`DataFetcher::stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetcherStats {
    /// Cache keys currently executing.
    pub pending_requests: usize,
    /// Sum of outstanding per-key retry counters.
    pub retry_count: u32,
    pub cache: CacheStats,
    /// Approximate number of cached aggregate results.
    pub aggregate_entries: u64,
}

/// Orchestrates reads from a document store.
///
/// A fetch runs the permission check, the rate-limit check and the cache
/// lookup in that order. On a miss, concurrent fetches of the same cache
/// key share one execution. An execution queries the store under a
/// timeout, validates and sanitizes the records and caches them; the whole
/// execution is retried with linear back-off.
pub struct DataFetcher {
    executor: Arc<dyn QueryExecutor>,
    oracle: Arc<dyn PermissionOracle>,
    cache: Arc<TtlCache<CachedPage>>,
    aggregates: AggregateCache,
    limiter: Arc<RateLimiter>,
    validator: DataValidator,
    config: FetcherConfig,
    pending: PendingRequests,
    /// cache key -> failed attempts of the execution in flight
    retries: Mutex<HashMap<String, u32>>,
    metrics: FetchMetrics,
}

impl DataFetcher {
    /// Creates a fetcher over shared cache and limiter instances.
    pub fn new(
        config: FetcherConfig,
        executor: Arc<dyn QueryExecutor>,
        oracle: Arc<dyn PermissionOracle>,
        cache: Arc<TtlCache<CachedPage>>,
        limiter: Arc<RateLimiter>,
        validator: DataValidator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            aggregates: AggregateCache::new(config.aggregate_ttl()),
            executor,
            oracle,
            cache,
            limiter,
            validator,
            config,
            pending: PendingRequests::new(),
            retries: Mutex::new(HashMap::new()),
            metrics: FetchMetrics::new(),
        })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TtlCache<CachedPage>> {
        &self.cache
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Name of the underlying store.
    pub fn executor_name(&self) -> &str {
        self.executor.name()
    }

    /// Fetches one page of `resource`.
    ///
    /// # Errors
    ///
    /// - `FetchError::AccessDenied` when the caller may not read `resource`
    /// - `FetchError::RateLimited` when admission control rejects the call
    /// - `FetchError::RetriesExhausted` when every execution attempt failed
    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn fetch_data(
        &self,
        resource: &str,
        options: FetchOptions,
    ) -> Result<FetchResult, FetchError> {
        let identity = self.admit(resource).await?;
        self.fetch_admitted(resource, options, identity.as_ref()).await
    }

    /// Runs the permission check, then the rate-limit check.
    async fn admit(&self, resource: &str) -> Result<Option<Identity>, FetchError> {
        let identity = self.authorize(resource).await?;
        let bucket = identity.as_ref().map_or("anonymous", |i| i.id.as_str());

        let decision = self.limiter.check_limit(bucket, resource);
        if let Some(reason) = decision.reason {
            let retry_after = decision.retry_after.unwrap_or_default();
            self.audit(
                "rate_limit_exceeded",
                json!({
                    "resource": resource,
                    "user_id": bucket,
                    "reason": reason,
                    "retry_after_ms": retry_after.as_millis() as u64,
                }),
            );
            return Err(FetchError::RateLimited {
                reason,
                retry_after,
            });
        }
        Ok(identity)
    }

    /// Cache lookup, coalescing and execution for an admitted caller.
    ///
    /// Keys carry the oracle's sanitization scope, so pages redacted for
    /// one permission level are never served to another.
    async fn fetch_admitted(
        &self,
        resource: &str,
        options: FetchOptions,
        identity: Option<&Identity>,
    ) -> Result<FetchResult, FetchError> {
        let key = with_scope(
            generate_key(resource, &options.filters, &options.key_options()),
            &self.oracle.scope(identity),
        );
        if options.use_cache {
            if let Some(page) = self.cache.get(&key) {
                debug!(key = %key, "Cache hit");
                return Ok(FetchResult::from_cached(page, &options));
            }
        }

        self.pending
            .run(&key, || self.execute_with_retry(resource, &key, &options, identity))
            .await
    }

    /// Resolves the caller and checks read access.
    ///
    /// Returns the identity, or `None` for an unauthenticated caller the
    /// pre-auth policy lets through.
    async fn authorize(&self, resource: &str) -> Result<Option<Identity>, FetchError> {
        match self.oracle.auth_state() {
            AuthState::Authenticated(identity) => {
                if self.oracle.can_read(&identity, resource).await {
                    return Ok(Some(identity));
                }
                self.deny(resource, json!(identity.id))
            },
            AuthState::Unauthenticated => match self.config.pre_auth_policy {
                PreAuthPolicy::AllowRead => {
                    debug!(resource = %resource, "No identity established, read allowed");
                    Ok(None)
                },
                PreAuthPolicy::Deny => self.deny(resource, Value::Null),
            },
        }
    }

    fn deny<T>(&self, resource: &str, user_id: Value) -> Result<T, FetchError> {
        self.metrics.record_denied(resource);
        self.audit(
            "unauthorized_access_attempt",
            json!({
                "resource": resource,
                "action": "read",
                "user_id": user_id,
            }),
        );
        Err(FetchError::access_denied(resource))
    }

    async fn execute_with_retry(
        &self,
        resource: &str,
        key: &str,
        options: &FetchOptions,
        identity: Option<&Identity>,
    ) -> Result<FetchResult, FetchError> {
        let max_attempts = self.config.max_retries;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.execute_once(resource, key, options, identity).await {
                Ok(result) => {
                    self.retries.lock().remove(key);
                    return Ok(result);
                },
                Err(err) => err,
            };

            if attempt >= max_attempts {
                self.retries.lock().remove(key);
                self.metrics.record_failure(resource);
                self.audit(
                    "fetch_failed",
                    json!({
                        "resource": resource,
                        "attempts": attempt,
                        "error": err.to_string(),
                    }),
                );
                return Err(FetchError::RetriesExhausted {
                    resource: resource.to_string(),
                    attempts: attempt,
                    cause: Box::new(err),
                });
            }

            *self.retries.lock().entry(key.to_string()).or_insert(0) += 1;
            self.metrics.record_retry(resource);

            let delay = self.config.retry_delay().saturating_mul(attempt);
            warn!(
                resource = %resource,
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Fetch attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn execute_once(
        &self,
        resource: &str,
        key: &str,
        options: &FetchOptions,
        identity: Option<&Identity>,
    ) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let query = options.to_query(resource);

        let timeout = self.config.query_timeout();
        let page = match tokio::time::timeout(timeout, self.executor.execute(&query)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    millis: self.config.query_timeout_ms,
                });
            },
        };

        let validation = self.validator.validate_data(&page.records, resource);
        if !validation.errors.is_empty() || !validation.warnings.is_empty() {
            debug!(
                resource = %resource,
                errors = validation.errors.len(),
                warnings = validation.warnings.len(),
                kept = validation.cleaned_data.len(),
                "Validation reported problems"
            );
        }
        let records = if validation.cleaned_data.is_empty() {
            page.records
        } else {
            validation.cleaned_data
        };

        let records = self.oracle.sanitize(records, resource, identity).await;
        let cursor = page.next_cursor;

        if options.use_cache {
            self.cache.set(
                key,
                CachedPage {
                    records: records.clone(),
                    cursor: cursor.clone(),
                },
                options.ttl,
            );
        }

        let elapsed = start.elapsed();
        self.metrics.record_duration(resource, elapsed);
        self.audit(
            "data_access",
            json!({
                "resource": resource,
                "record_count": records.len(),
                "elapsed_ms": elapsed.as_millis() as u64,
                "from_cache": false,
            }),
        );

        Ok(FetchResult {
            has_more: options.has_more(records.len()),
            data: records,
            from_cache: false,
            fetch_time_ms: Some(elapsed.as_secs_f64() * 1000.0),
            cursor,
        })
    }

    /// Fetches consecutive pages by following result cursors.
    ///
    /// Stops on a short page, when `has_more` is false, when a page has no
    /// cursor or after `max_pages`. The returned result concatenates every
    /// page; `from_cache` is true only if every page came from the cache.
    pub async fn fetch_paginated(
        &self,
        resource: &str,
        options: PageOptions,
    ) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let PageOptions {
            page_size,
            max_pages,
            base,
        } = options;

        let mut data = Vec::new();
        let mut cursor = base.start_after.clone();
        let mut from_cache = true;
        let mut has_more = false;
        let mut pages = 0;

        while pages < max_pages {
            let page_options = base.clone().limit(page_size).maybe_start_after(cursor.take());
            let page = self.fetch_data(resource, page_options).await?;
            pages += 1;

            let returned = page.data.len();
            from_cache &= page.from_cache;
            has_more = page.has_more;
            cursor = page.cursor;
            data.extend(page.data);

            if returned < page_size || !has_more || cursor.is_none() {
                break;
            }
        }

        debug!(resource = %resource, pages = pages, records = data.len(), "Paginated fetch completed");
        Ok(FetchResult {
            data,
            from_cache: from_cache && pages > 0,
            has_more,
            fetch_time_ms: Some(start.elapsed().as_secs_f64() * 1000.0),
            cursor,
        })
    }

    /// Computes aggregations over the whole dataset of `resource`.
    ///
    /// Admission matches [`fetch_data`]: every call, cached or not, is
    /// checked and counted by the rate limiter. Results are cached per
    /// resource, sanitization scope and aggregation spec for
    /// `aggregate_ttl`; the underlying dataset goes through the page cache.
    ///
    /// [`fetch_data`]: Self::fetch_data
    pub async fn fetch_aggregated(
        &self,
        resource: &str,
        aggregations: &[Aggregation],
    ) -> Result<Arc<AggregateResult>, FetchError> {
        let identity = self.admit(resource).await?;
        let scope = self.oracle.scope(identity.as_ref());

        let key = AggregateCache::key(resource, &scope, &canonical_json(aggregations));
        if let Some(cached) = self.aggregates.get(&key).await {
            debug!(key = %key, "Aggregate cache hit");
            return Ok(cached);
        }

        let dataset = self
            .fetch_admitted(resource, FetchOptions::default(), identity.as_ref())
            .await?;
        let result = Arc::new(AggregateResult::compute(&dataset.data, aggregations));
        self.aggregates.insert(key, Arc::clone(&result)).await;
        Ok(result)
    }

    /// Drops every cached page and aggregate of `resource`.
    pub async fn invalidate_cache(&self, resource: &str) -> InvalidationResult {
        let mut result = self.cache.invalidate_resource(resource);
        let aggregates = self.aggregates.invalidate_resource(resource).await;
        result.count += aggregates;

        info!(
            resource = %resource,
            count = result.count,
            aggregates = aggregates,
            "Cache invalidated for resource"
        );
        result
    }

    /// Returns in-flight, retry and cache statistics.
    pub fn stats(&self) -> FetcherStats {
        FetcherStats {
            pending_requests: self.pending.len(),
            retry_count: self.retries.lock().values().sum(),
            cache: self.cache.stats(),
            aggregate_entries: self.aggregates.entry_count(),
        }
    }

    /// Logs an audit event through the oracle, tagged with a fresh event id.
    fn audit(&self, event: &str, mut details: Value) {
        if let Value::Object(map) = &mut details {
            map.insert("event_id".to_string(), json!(Uuid::now_v7().to_string()));
        }
        self.oracle.log_event(event, details);
    }
}

impl std::fmt::Debug for DataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFetcher")
            .field("executor", &self.executor_name())
            .field("config", &self.config)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
