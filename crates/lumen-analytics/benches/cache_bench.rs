use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Runtime;

use lumen_analytics::cache::{CacheConfig, KeyOptions, TtlCache, generate_key};
use lumen_analytics::fetcher::CachedPage;
use lumen_analytics::{DataFetcher, FetchOptions, RateLimitConfig, RateLimiter, Settings};
use lumen_core::{DataValidator, Filter, FilterOp, OrderBy, Record};
use lumen_source::{MemoryStore, StaticPermissions};

/// Crea una pagina de prueba con N registros
fn create_test_page(num_records: usize) -> CachedPage {
    let records: Vec<Record> = (0..num_records)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "id": format!("e{}", i),
                "kind": "click",
                "duration_ms": i,
            }))
            .unwrap()
        })
        .collect();

    CachedPage {
        records,
        cursor: None,
    }
}

fn create_cache(max_entries: usize) -> TtlCache<CachedPage> {
    TtlCache::new(CacheConfig {
        max_entries,
        ..Default::default()
    })
    .unwrap()
}

/// Limites que nunca rechazan, para medir solo el costo del check
fn unlimited() -> RateLimitConfig {
    RateLimitConfig {
        per_resource: Default::default(),
        default_per_resource: u32::MAX,
        global_per_minute: u32::MAX,
        global_per_hour: u32::MAX,
        burst_per_second: u32::MAX,
        ..Default::default()
    }
}

/// Benchmark: Cache get (hit)
fn bench_cache_get_hit(c: &mut Criterion) {
    let cache = create_cache(100);
    cache.set("events|l=10", create_test_page(100), None);

    c.bench_function("cache_get_hit", |b| {
        b.iter(|| std::hint::black_box(cache.get("events|l=10")));
    });
}

/// Benchmark: Cache get (miss)
fn bench_cache_get_miss(c: &mut Criterion) {
    let cache = create_cache(100);

    c.bench_function("cache_get_miss", |b| {
        b.iter(|| std::hint::black_box(cache.get("nonexistent")));
    });
}

/// Benchmark: Cache set con eviction (cache lleno)
fn bench_cache_set_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_set_evicting");

    for capacity in [100, 1000] {
        let cache = create_cache(capacity);
        let page = create_test_page(10);
        for i in 0..capacity {
            cache.set(format!("events|l={}", i), page.clone(), None);
        }
        let counter = AtomicU64::new(capacity as u64);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                let count = counter.fetch_add(1, Ordering::Relaxed);
                cache.set(format!("events|l={}", count), page.clone(), None);
            });
        });
    }

    group.finish();
}

/// Benchmark: Generacion de keys
fn bench_generate_key(c: &mut Criterion) {
    let filters = vec![
        Filter::eq("kind", "click"),
        Filter::new("duration_ms", FilterOp::Gt, 100),
        Filter::new("tags", FilterOp::ArrayContainsAny, serde_json::json!(["a", "b"])),
    ];
    let options = KeyOptions {
        limit: Some(50),
        order_by: Some(OrderBy::desc("created_at")),
        start_after: None,
    };

    c.bench_function("generate_key", |b| {
        b.iter(|| std::hint::black_box(generate_key("events", &filters, &options)));
    });
}

/// Benchmark: check_limit del rate limiter
fn bench_rate_limit_check(c: &mut Criterion) {
    let limiter = RateLimiter::new(unlimited()).unwrap();

    c.bench_function("rate_limit_check", |b| {
        b.iter(|| std::hint::black_box(limiter.check_limit("u-1", "reports")));
    });
}

/// Benchmark: fetch_data servido desde cache
fn bench_fetch_cached(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let settings = Settings::default();

    let store = MemoryStore::new();
    store.insert("events", create_test_page(100).records);

    let fetcher = Arc::new(
        DataFetcher::new(
            settings.fetcher.clone(),
            Arc::new(store),
            Arc::new(StaticPermissions::unauthenticated()),
            Arc::new(TtlCache::new(settings.cache.clone()).unwrap()),
            Arc::new(RateLimiter::new(unlimited()).unwrap()),
            DataValidator::default(),
        )
        .unwrap(),
    );

    // Pre-populate cache
    rt.block_on(async {
        fetcher
            .fetch_data("events", FetchOptions::new().limit(10))
            .await
            .unwrap();
    });

    c.bench_function("fetch_cached", |b| {
        b.to_async(&rt).iter(|| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let result = fetcher
                    .fetch_data("events", FetchOptions::new().limit(10))
                    .await;
                std::hint::black_box(result)
            }
        });
    });
}

criterion_group!(
    benches,
    bench_cache_get_hit,
    bench_cache_get_miss,
    bench_cache_set_evicting,
    bench_generate_key,
    bench_rate_limit_check,
    bench_fetch_cached,
);
criterion_main!(benches);
