//! # Trigger Dispatch Benchmarks
//!
//! Hot paths run once per received event:
//!
//! | Path | Runs for |
//! |------|----------|
//! | `UserRateLimiter::allow` | Every user-triggered event |
//! | `TriggerCache::resolve` (hit) | Every event after the first per channel |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_bus::InMemoryCache;
use shared_types::ExecData;
use std::sync::Arc;
use std::time::Duration;
use trigger_dispatch::{InMemoryFunctionStore, TriggerCache, UserRateLimiter};

fn bench_rate_limiter(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let _guard = runtime.enter();

    let mut group = c.benchmark_group("rate-limiter");
    for users in [1usize, 100, 10_000] {
        let limiter = UserRateLimiter::new(5, Duration::from_secs(60));
        let ids: Vec<String> = (0..users).map(|i| format!("user-{i}")).collect();

        group.throughput(Throughput::Elements(users as u64));
        group.bench_with_input(BenchmarkId::new("allow", users), &ids, |b, ids| {
            b.iter(|| {
                for id in ids {
                    black_box(limiter.allow(id));
                }
            })
        });
    }
    group.finish();
}

fn bench_trigger_cache_hit(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("trigger-cache");
    for functions in [1usize, 10, 50] {
        let store = Arc::new(InMemoryFunctionStore::new());
        for i in 0..functions {
            store.register(
                "bench",
                ExecData::new(format!("f{i}"), format!("fn{i}"), "orders", "ok()"),
            );
        }
        let triggers = TriggerCache::new(Arc::new(InMemoryCache::new()), store);
        runtime
            .block_on(triggers.resolve("bench", "orders"))
            .expect("warm cache");

        group.throughput(Throughput::Elements(functions as u64));
        group.bench_function(BenchmarkId::new("resolve_hit", functions), |b| {
            b.iter(|| black_box(runtime.block_on(triggers.resolve("bench", "orders"))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rate_limiter, bench_trigger_cache_hit);
criterion_main!(benches);
