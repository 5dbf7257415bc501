//! Aggregate result cache using Moka.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;
use tracing::debug;

use crate::fetcher::AggregateResult;
use crate::metrics::CacheMetrics;

/// Cache de resultados de agregacion con TTL fijo.
/// Thread-safe y async-friendly.
#[derive(Clone)]
pub struct AggregateCache {
    inner: Cache<String, Arc<AggregateResult>>,
    metrics: CacheMetrics,
}

impl AggregateCache {
    /// Crea un nuevo cache con el TTL dado.
    pub fn new(ttl: Duration) -> Self {
        let metrics = CacheMetrics::new("aggregates");

        // Configurar listener para evictions
        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .time_to_live(ttl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self { inner, metrics }
    }

    /// Key de un resultado: `agg|<resource>|p=<scope>|<spec>`.
    pub fn key(resource: &str, scope: &str, spec: &str) -> String {
        format!("agg|{}|p={}|{}", resource, scope, spec)
    }

    /// Obtiene un resultado si existe.
    pub async fn get(&self, key: &str) -> Option<Arc<AggregateResult>> {
        let result = self.inner.get(key).await;

        if result.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }

        result
    }

    /// Inserta un resultado.
    pub async fn insert(&self, key: String, value: Arc<AggregateResult>) {
        self.inner.insert(key, value).await;
        self.metrics.update_entry_count(self.inner.entry_count() as usize);
    }

    /// Invalida todos los resultados de un recurso. Retorna cuantos invalido.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let prefix = format!("agg|{}|", resource);

        // Snapshot: entries pueden cambiar durante iteracion
        let keys: Vec<Arc<String>> = self
            .inner
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key)
            .collect();

        for key in &keys {
            self.inner.invalidate(key.as_str()).await;
        }

        debug!(resource = %resource, count = keys.len(), "Aggregate entries invalidated");
        keys.len()
    }

    /// Retorna el numero aproximado de entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Procesa las tareas pendientes de Moka (conteos exactos en tests).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}
