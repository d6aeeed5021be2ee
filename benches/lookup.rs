use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ordnance::{ConnectionManager, InMemoryConnector, InMemoryStore, LookupConfig, LookupGateway};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

const RECORDS: usize = 20_000;

fn seeded_gateway() -> Arc<LookupGateway> {
    let store = Arc::new(InMemoryStore::new());
    let records = (0..RECORDS).map(|i| {
        json!({
            "UPRN": i,
            "POSTCODE_LOCATOR": format!("AB{} {}CD", i % 50, i % 9),
            "X_COORDINATE": 400_000.0 + (i % 1000) as f64,
            "Y_COORDINATE": 100_000.0 + (i / 1000) as f64 * 10.0,
        })
    });
    store
        .insert_many("BLPU", records)
        .expect("seeding should succeed");

    let connector = InMemoryConnector::new(store, "bench", "bench");
    Arc::new(LookupGateway::new(
        ConnectionManager::new(Box::new(connector)),
        LookupConfig::default(),
    ))
}

/// Postcode and bounding-box lookups over a warm session
fn bench_lookups(c: &mut Criterion) {
    let gateway = seeded_gateway();
    let mut group = c.benchmark_group("lookups");

    group.bench_function("postcode", |b| {
        b.iter(|| {
            gateway
                .find_by_postcode(black_box("AB7 7CD"), Some(25))
                .expect("lookup should succeed")
        })
    });

    for tolerance in [5_i64, 50, 500] {
        group.bench_with_input(
            BenchmarkId::new("location", tolerance),
            &tolerance,
            |b, &tolerance| {
                b.iter(|| {
                    gateway
                        .find_by_location(
                            black_box(100_050.0),
                            black_box(400_500.0),
                            Some(tolerance),
                            Some(100),
                        )
                        .expect("lookup should succeed")
                })
            },
        );
    }

    group.finish();
}

/// Many threads sharing one cached session
fn bench_concurrent_lookups(c: &mut Criterion) {
    let gateway = seeded_gateway();
    let mut group = c.benchmark_group("concurrent_lookups");
    let lookups_per_thread = 100;

    for num_threads in [1, 4, 8] {
        group.throughput(Throughput::Elements((num_threads * lookups_per_thread) as u64));
        group.bench_function(format!("{num_threads}_threads"), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..num_threads)
                    .map(|t| {
                        let gateway = Arc::clone(&gateway);
                        thread::spawn(move || {
                            for i in 0..lookups_per_thread {
                                let postcode = format!("AB{} {}CD", (t + i) % 50, i % 9);
                                gateway
                                    .find_by_postcode(&postcode, None)
                                    .expect("lookup should succeed");
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().expect("thread should complete");
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookups, bench_concurrent_lookups);
criterion_main!(benches);
