//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    // Describir metricas
    metrics::describe_counter!("lumen_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("lumen_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "lumen_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("lumen_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "lumen_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos, el label `cache` distingue cada instancia.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    cache: &'static str,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new(cache: &'static str) -> Self {
        Self {
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("lumen_cache_hits_total", "cache" => self.cache).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("lumen_cache_misses_total", "cache" => self.cache).increment(1);
    }

    /// Registra una eviction (ttl, capacity, manual, replaced)
    pub fn record_eviction(&self, reason: &'static str) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!(
            "lumen_cache_evictions_total",
            "cache" => self.cache,
            "reason" => reason
        )
        .increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("lumen_cache_entries", "cache" => self.cache).set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(
            "lumen_cache_operation_seconds",
            "cache" => self.cache,
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate sobre lookups (para logging/debugging)
    pub fn lookup_hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new("test");

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        let rate = metrics.lookup_hit_rate();
        assert!((rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_counters() {
        let metrics = CacheMetrics::new("test");

        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.misses(), 0);
        assert_eq!(metrics.lookup_hit_rate(), 0.0);

        metrics.record_hit();
        metrics.record_miss();
        metrics.record_eviction("capacity");
        metrics.record_eviction("ttl");

        assert_eq!(metrics.hits(), 1);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.evictions(), 2);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new("test");
        let clone = metrics.clone();
        clone.record_hit();
        assert_eq!(metrics.hits(), 1);
    }
}
