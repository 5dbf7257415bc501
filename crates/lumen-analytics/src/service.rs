//! Composition root.

use std::sync::Arc;

use lumen_core::{DataValidator, Result};
use lumen_source::{PermissionOracle, QueryExecutor, SweepHandle, SweepScheduler};
use parking_lot::Mutex;
use tracing::info;

use crate::cache::TtlCache;
use crate::fetcher::{CachedPage, DataFetcher};
use crate::ratelimit::RateLimiter;
use crate::settings::Settings;

/// One analytics data-access stack: cache, limiter, validator and fetcher,
/// plus the background sweeps that maintain the cache and the limiter.
///
/// Both sweeps stop on [`shutdown`](Self::shutdown) or when the service is
/// dropped. Must be constructed inside a tokio runtime.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lumen_analytics::{AnalyticsService, FetchOptions, Settings};
/// use lumen_source::{MemoryStore, StaticPermissions};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.insert_json("events", json!([{"id": "e1"}, {"id": "e2"}]))?;
///
/// let service = AnalyticsService::new(
///     Settings::default(),
///     Arc::new(store),
///     Arc::new(StaticPermissions::unauthenticated()),
/// )?;
///
/// let result = service.fetcher().fetch_data("events", FetchOptions::new()).await?;
/// assert_eq!(result.len(), 2);
/// service.shutdown();
/// # Ok(())
/// # }
/// ```
pub struct AnalyticsService {
    settings: Settings,
    fetcher: Arc<DataFetcher>,
    sweeps: Mutex<Vec<SweepHandle>>,
}

impl AnalyticsService {
    /// Builds every component from `settings` and starts the sweeps.
    pub fn new(
        settings: Settings,
        executor: Arc<dyn QueryExecutor>,
        oracle: Arc<dyn PermissionOracle>,
    ) -> Result<Self> {
        settings.validate()?;

        let cache = Arc::new(TtlCache::<CachedPage>::new(settings.cache.clone())?);
        let limiter = Arc::new(RateLimiter::new(settings.rate_limit.clone())?);
        let validator = DataValidator::new(settings.validator.clone())?;

        let sweeps = vec![
            SweepScheduler::every(Arc::clone(&cache), settings.cache.sweep_interval()).start(),
            SweepScheduler::every(Arc::clone(&limiter), settings.rate_limit.cleanup_interval())
                .start(),
        ];

        let fetcher = DataFetcher::new(
            settings.fetcher.clone(),
            executor,
            oracle,
            cache,
            limiter,
            validator,
        )?;

        info!(
            store = fetcher.executor_name(),
            max_entries = settings.cache.max_entries,
            "Analytics service started"
        );

        Ok(Self {
            settings,
            fetcher: Arc::new(fetcher),
            sweeps: Mutex::new(sweeps),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The fetcher, shareable with UI and report code.
    pub fn fetcher(&self) -> &Arc<DataFetcher> {
        &self.fetcher
    }

    pub fn cache(&self) -> &Arc<TtlCache<CachedPage>> {
        self.fetcher.cache()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.fetcher.limiter()
    }

    /// Stops the background sweeps. Idempotent.
    pub fn shutdown(&self) {
        let handles: Vec<SweepHandle> = self.sweeps.lock().drain(..).collect();
        if !handles.is_empty() {
            info!("Stopping analytics service sweeps");
        }
        for handle in handles {
            handle.stop();
        }
    }

    /// Returns true while the sweeps are running.
    pub fn is_running(&self) -> bool {
        self.sweeps.lock().iter().any(|h| !h.is_stopped())
    }
}
