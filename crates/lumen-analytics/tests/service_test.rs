//! Integration tests for the analytics service lifecycle.

mod helpers;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use helpers::*;
use lumen_analytics::{AnalyticsService, FetchOptions, Settings};
use lumen_source::StaticPermissions;

#[tokio::test(start_paused = true)]
async fn test_cache_sweep_purges_expired_pages() {
    let mut settings = Settings::default();
    settings.cache.sweep_interval_ms = 10_000;
    let service = AnalyticsService::new(
        settings,
        Arc::new(store(3)),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();

    service
        .fetcher()
        .fetch_data("events", FetchOptions::new().ttl(Duration::from_secs(2)))
        .await
        .unwrap();
    service
        .fetcher()
        .fetch_data("users", FetchOptions::new())
        .await
        .unwrap();
    assert_eq!(service.cache().len(), 2);

    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(service.cache().len(), 1);
    assert_eq!(service.cache().keys(), vec!["users|p=full".to_string()]);
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_limiter_cleanup_drops_idle_windows() {
    let mut settings = Settings::default();
    settings.rate_limit.cleanup_interval_ms = 60_000;
    let service = AnalyticsService::new(
        settings,
        Arc::new(store(2)),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();

    service
        .fetcher()
        .fetch_data("events", FetchOptions::new())
        .await
        .unwrap();
    assert_eq!(service.limiter().usage_stats().resources.len(), 1);

    tokio::time::sleep(Duration::from_secs(3660)).await;

    let usage = service.limiter().usage_stats();
    assert!(usage.resources.is_empty());
    assert_eq!(usage.global_hour.count, 0);
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_sweeps() {
    let mut settings = Settings::default();
    settings.cache.sweep_interval_ms = 1_000;
    let service = AnalyticsService::new(
        settings,
        Arc::new(store(1)),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();
    assert!(service.is_running());

    service.shutdown();
    service.shutdown();
    assert!(!service.is_running());

    service
        .fetcher()
        .fetch_data("events", FetchOptions::new().ttl(Duration::from_millis(500)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // nothing sweeps anymore; the expired entry stays until touched
    assert_eq!(service.cache().len(), 1);
    assert!(!service.cache().has(&service.cache().keys()[0]));
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let mut settings = Settings::default();
    settings.rate_limit.burst_per_second = 0;

    let result = AnalyticsService::new(
        settings,
        Arc::new(store(1)),
        Arc::new(StaticPermissions::unauthenticated()),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_service_from_settings_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[cache]
max_entries = 1

[fetcher]
pre_auth_policy = "deny"
"#
    )
    .unwrap();

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.cache.max_entries, 1);

    let service = AnalyticsService::new(
        settings,
        Arc::new(store(2)),
        Arc::new(StaticPermissions::unauthenticated()),
    )
    .unwrap();
    let err = service
        .fetcher()
        .fetch_data("events", FetchOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, lumen_analytics::FetchError::AccessDenied { .. }));
    service.shutdown();
}
