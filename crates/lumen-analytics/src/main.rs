//! Lumen inspect binary.
//!
//! Loads settings and a JSON dataset, runs a fetch, a repeat fetch and a
//! count aggregation against an in-memory store, then prints the metrics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use lumen_analytics::metrics::init_metrics;
use lumen_analytics::{AnalyticsService, Aggregation, FetchOptions, Settings};
use lumen_source::{MemoryStore, StaticPermissions};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics = init_metrics().context("failed to install metrics recorder")?;

    // Get inspect configuration from environment
    let config_path = std::env::var("LUMEN_CONFIG").ok().map(PathBuf::from);
    let resource = std::env::var("LUMEN_RESOURCE").unwrap_or_else(|_| "events".to_string());

    let settings = Settings::load(config_path.as_deref()).context("failed to load settings")?;

    let store = match std::env::var("LUMEN_DATASET") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read dataset {}", path))?;
            let value: serde_json::Value =
                serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path))?;
            MemoryStore::from_json(value)?
        },
        Err(_) => {
            tracing::info!("LUMEN_DATASET not set, using a sample dataset");
            MemoryStore::from_json(json!({
                "events": [
                    {"id": "e1", "kind": "click", "created_at": "2024-01-01T10:00:00Z"},
                    {"id": "e2", "kind": "view", "created_at": "2024-01-01T10:05:00Z"},
                    {"id": "e3", "kind": "click", "created_at": "2024-01-01T10:07:00Z"},
                ]
            }))?
        },
    };

    tracing::info!("Starting Lumen inspect v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Resource: {}", resource);

    let service = AnalyticsService::new(
        settings,
        Arc::new(store),
        Arc::new(StaticPermissions::unauthenticated()),
    )?;
    let fetcher = service.fetcher();

    let first = fetcher.fetch_data(&resource, FetchOptions::new().limit(10)).await?;
    tracing::info!(
        records = first.len(),
        from_cache = first.from_cache,
        fetch_time_ms = first.fetch_time_ms.unwrap_or_default(),
        "First fetch"
    );

    let second = fetcher.fetch_data(&resource, FetchOptions::new().limit(10)).await?;
    tracing::info!(records = second.len(), from_cache = second.from_cache, "Repeat fetch");

    let aggregate = fetcher.fetch_aggregated(&resource, &[Aggregation::Count]).await?;
    tracing::info!("Aggregate: {}", serde_json::to_string(aggregate.as_ref())?);

    tracing::info!("Fetcher stats: {}", serde_json::to_string(&fetcher.stats())?);
    tracing::info!(
        "Rate limit usage: {}",
        serde_json::to_string(&service.limiter().usage_stats())?
    );

    service.shutdown();
    println!("{}", metrics.render());

    Ok(())
}
