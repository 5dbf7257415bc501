//! End-to-end dashboard scenario over the events resource.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::*;
use lumen_analytics::{AnalyticsService, FetchOptions, Settings};
use lumen_core::Filter;
use lumen_source::StaticPermissions;

fn dashboard_settings() -> Settings {
    let mut settings = Settings::default();
    settings.rate_limit.per_resource.insert("events".to_string(), 30);
    settings.cache.default_ttl_ms = 5 * 60 * 1000;
    settings
}

#[tokio::test(start_paused = true)]
async fn test_events_dashboard_load() {
    let store = Arc::new(slow_store(25, Duration::from_millis(50)));
    store.push(
        "events",
        serde_json::from_value(serde_json::json!({"id": "e26", "kind": "purchase"})).unwrap(),
    );
    let service = AnalyticsService::new(
        dashboard_settings(),
        store.clone(),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();
    let fetcher = service.fetcher();

    let (a, b, c) = tokio::join!(
        fetcher.fetch_data("events", FetchOptions::new().limit(10)),
        fetcher.fetch_data("events", FetchOptions::new().limit(10)),
        fetcher.fetch_data("events", FetchOptions::new().limit(10)),
    );
    for result in [a.unwrap(), b.unwrap(), c.unwrap()] {
        assert!(result.len() <= 10);
        assert!(!result.from_cache);
    }
    assert_eq!(store.executions(), 1);

    let usage = fetcher.limiter().usage_stats();
    assert_eq!(usage.resources["anonymous:events"].recent, 3);
    assert_eq!(usage.resources["anonymous:events"].limit, 30);

    let purchases = fetcher
        .fetch_data(
            "events",
            FetchOptions::new().filter(Filter::eq("kind", "purchase")).limit(10),
        )
        .await
        .unwrap();
    assert_eq!(purchases.len(), 1);
    assert!(!purchases.has_more);
    assert_eq!(store.executions(), 2);

    let usage = fetcher.limiter().usage_stats();
    assert_eq!(usage.resources["anonymous:events"].recent, 4);
    assert_eq!(usage.global_minute.count, 4);
    assert_eq!(usage.global_hour.count, 4);
    assert!(usage.burst.count <= 4);

    // still cached well inside the five minute TTL
    tokio::time::advance(Duration::from_secs(4 * 60)).await;
    let cached = fetcher
        .fetch_data("events", FetchOptions::new().limit(10))
        .await
        .unwrap();
    assert!(cached.from_cache);
    assert_eq!(store.executions(), 2);

    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_burst_tier_is_shared_across_resources() {
    let mut settings = dashboard_settings();
    settings.rate_limit.burst_per_second = 3;
    let service = AnalyticsService::new(
        settings,
        Arc::new(store(3)),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();
    let fetcher = service.fetcher();

    fetcher.fetch_data("events", FetchOptions::new()).await.unwrap();
    fetcher.fetch_data("users", FetchOptions::new()).await.unwrap();
    fetcher.fetch_data("events", FetchOptions::new().limit(1)).await.unwrap();

    let err = fetcher
        .fetch_data("users", FetchOptions::new().limit(1))
        .await
        .unwrap_err();
    assert!(err.is_immediate());
    assert!(err.retry_after().unwrap() <= Duration::from_secs(1));

    tokio::time::advance(Duration::from_millis(1001)).await;
    fetcher
        .fetch_data("users", FetchOptions::new().limit(1))
        .await
        .unwrap();

    service.shutdown();
}
