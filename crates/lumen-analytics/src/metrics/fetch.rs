//! Fetcher and rate limiter metrics.

use metrics::{counter, histogram};
use std::time::Duration;

/// Registra las metricas del fetcher y del rate limiter.
pub fn register_fetch_metrics() {
    metrics::describe_histogram!(
        "lumen_fetch_duration_seconds",
        "Time spent executing, validating and caching a fetch"
    );
    metrics::describe_counter!(
        "lumen_fetch_retries_total",
        "Total number of fetch retry attempts"
    );
    metrics::describe_counter!(
        "lumen_fetch_failures_total",
        "Total number of fetches that failed after exhausting retries"
    );
    metrics::describe_counter!(
        "lumen_fetch_denied_total",
        "Total number of fetches rejected by the permission check"
    );
    metrics::describe_counter!(
        "lumen_ratelimit_rejections_total",
        "Total number of requests rejected by the rate limiter"
    );
}

/// Registra un rechazo del rate limiter por tier
pub fn record_rate_limit_rejection(tier: &'static str) {
    counter!("lumen_ratelimit_rejections_total", "tier" => tier).increment(1);
}

/// Recorder de metricas del fetcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchMetrics;

impl FetchMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Registra la duracion de un fetch exitoso
    pub fn record_duration(&self, resource: &str, duration: Duration) {
        histogram!(
            "lumen_fetch_duration_seconds",
            "resource" => resource.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Registra un reintento
    pub fn record_retry(&self, resource: &str) {
        counter!("lumen_fetch_retries_total", "resource" => resource.to_string()).increment(1);
    }

    /// Registra un fetch fallido tras agotar reintentos
    pub fn record_failure(&self, resource: &str) {
        counter!("lumen_fetch_failures_total", "resource" => resource.to_string()).increment(1);
    }

    /// Registra un acceso denegado
    pub fn record_denied(&self, resource: &str) {
        counter!("lumen_fetch_denied_total", "resource" => resource.to_string()).increment(1);
    }
}
