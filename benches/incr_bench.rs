// Bounded increment benchmarks
//
// Compares the single-script bounded increment with an unguarded
// read-then-write done by the client, which is what the script replaces.

use bounded_counter::{BoundedCounter, MemoryStore, Options, ScriptStore};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

fn setup_counter() -> BoundedCounter<MemoryStore> {
    let counter = BoundedCounter::open(Options::default()).unwrap();
    counter.init().unwrap();
    counter
}

fn benchmark_incr_with_limit(c: &mut Criterion) {
    let mut group = c.benchmark_group("incr_with_limit");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let counter = setup_counter();
            b.iter(|| {
                for _ in 0..size {
                    black_box(counter.incr_with_limit("bench", 1_000_000).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_client_read_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("client_read_write");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let store = MemoryStore::new(&Options::default());
            b.iter(|| {
                for _ in 0..size {
                    let current: i64 = store
                        .get(b"bench")
                        .unwrap()
                        .and_then(|raw| String::from_utf8(raw).ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                    store.set(b"bench", (current + 1).to_string().as_bytes()).unwrap();
                }
            });
        });
    }

    group.finish();
}

fn benchmark_reload_after_flush(c: &mut Criterion) {
    let counter = setup_counter();
    c.bench_function("incr_with_limit_after_flush", |b| {
        b.iter(|| {
            counter.store().script_flush();
            black_box(counter.incr_with_limit("bench", 1_000_000).unwrap());
        });
    });
}

criterion_group!(
    benches,
    benchmark_incr_with_limit,
    benchmark_client_read_write,
    benchmark_reload_after_flush
);
criterion_main!(benches);
