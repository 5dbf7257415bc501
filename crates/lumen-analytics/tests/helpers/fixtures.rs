//! Datos y constructores compartidos.

use std::sync::Arc;
use std::time::Duration;

use lumen_analytics::cache::TtlCache;
use lumen_analytics::{DataFetcher, RateLimiter, Settings};
use lumen_core::DataValidator;
use lumen_source::{MemoryStore, PermissionOracle, QueryExecutor};
use serde_json::{Value, json};

/// `n` eventos con ids `e1..en`, alternando `click`/`view`.
pub fn events(n: usize) -> Value {
    let records: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "id": format!("e{}", i),
                "kind": if i % 2 == 1 { "click" } else { "view" },
                "duration_ms": i * 10,
                "created_at": format!("2024-03-{:02}T08:00:00Z", i.min(28)),
            })
        })
        .collect();
    Value::Array(records)
}

pub fn users() -> Value {
    json!([
        {"id": "u1", "role": "admin", "email": "ana@example.com"},
        {"id": "u2", "role": "viewer", "email": "not-an-email"},
    ])
}

/// Store con `events` (n registros) y `users`.
pub fn store(n: usize) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_json("events", events(n)).unwrap();
    store.insert_json("users", users()).unwrap();
    store
}

/// Store con latencia simulada.
pub fn slow_store(n: usize, latency: Duration) -> MemoryStore {
    let store = MemoryStore::with_latency(latency);
    store.insert_json("events", events(n)).unwrap();
    store
}

/// Construye un fetcher sin sweeps en background.
pub fn fetcher(
    settings: &Settings,
    executor: Arc<dyn QueryExecutor>,
    oracle: Arc<dyn PermissionOracle>,
) -> DataFetcher {
    DataFetcher::new(
        settings.fetcher.clone(),
        executor,
        oracle,
        Arc::new(TtlCache::new(settings.cache.clone()).unwrap()),
        Arc::new(RateLimiter::new(settings.rate_limit.clone()).unwrap()),
        DataValidator::new(settings.validator.clone()).unwrap(),
    )
    .unwrap()
}

/// Settings con retry rapido para tests.
pub fn fast_retry_settings() -> Settings {
    let mut settings = Settings::default();
    settings.fetcher.retry_delay_ms = 10;
    settings
}
