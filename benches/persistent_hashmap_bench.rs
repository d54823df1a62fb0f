//! Benchmark for PersistentHashMap vs standard HashMap.
//!
//! Compares the persistent map against Rust's standard HashMap for
//! common operations, plus the persistence-specific costs the standard
//! map has no equivalent for (snapshotting and version divergence).

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use chamt::PersistentHashMap;
use std::collections::HashMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentHashMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = HashMap::new();
                    for index in 0..size {
                        map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index * 2)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index * 2)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = persistent_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = standard_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("remove");

    for size in [1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = persistent_map.clone();
                    for key in 0..size {
                        map = map.remove(&black_box(key));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();
                    for key in 0..size {
                        map.remove(&black_box(key));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// iterate Benchmark
// =============================================================================

fn benchmark_iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iterate");

    for size in [1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let sum: i64 = persistent_map
                        .iter()
                        .map(|(_, value)| i64::from(*value))
                        .sum();
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: i64 = standard_map.iter().map(|(_, value)| i64::from(*value)).sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// snapshot Benchmark: what persistence buys
// =============================================================================

fn benchmark_snapshot(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("snapshot_then_diverge");

    for size in [10_000] {
        let persistent_map: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        // O(1) snapshot plus one divergent insert.
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let snapshot = persistent_map.clone();
                    black_box(snapshot.insert(black_box(-1), black_box(-1)))
                });
            },
        );

        // The standard map has to copy everything to snapshot.
        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut snapshot = standard_map.clone();
                snapshot.insert(black_box(-1), black_box(-1));
                black_box(snapshot)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_iterate,
    benchmark_snapshot
);
criterion_main!(benches);
