use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use powerlist::PowerList;
use std::collections::BTreeSet;

fn bench_power_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("power_list_vs_btree");

    // Insert 1000 items
    group.bench_function("std_btreeset_insert_1000", |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for i in 0..1000 {
                set.insert(black_box(i));
            }
        });
    });

    group.bench_function("power_list_append_1000", |b| {
        b.iter(|| {
            let mut list = PowerList::new();
            for i in 0..1000 {
                list.insert(black_box(i));
            }
        });
    });

    group.bench_function("power_list_build_1000", |b| {
        b.iter(|| PowerList::from_sorted(black_box(0..1000)));
    });

    // Lookup
    group.bench_function("std_btreeset_lookup", |b| {
        let set: BTreeSet<i32> = (0..1000).collect();
        b.iter(|| {
            for i in 0..1000 {
                black_box(set.contains(&i));
            }
        });
    });

    group.bench_function("power_list_lookup_balanced", |b| {
        let list = PowerList::from_sorted(0..1000).unwrap();
        b.iter(|| {
            for i in 0..1000 {
                black_box(list.contains(&i));
            }
        });
    });

    group.bench_function("power_list_lookup_dirty", |b| {
        let mut list = PowerList::new();
        for i in 0..1000 {
            list.insert(i);
        }
        b.iter(|| {
            for i in (0..1000).step_by(10) {
                black_box(list.contains(&i));
            }
        });
    });

    group.finish();
}

fn bench_rebalance(c: &mut Criterion) {
    let mut group = c.benchmark_group("power_list_rebalance");

    for size in [1_000, 10_000] {
        group.bench_function(format!("rebalance_{size}"), |b| {
            b.iter_batched(
                || {
                    let mut list = PowerList::new();
                    list.extend(0..size);
                    list
                },
                |mut list| {
                    list.rebalance();
                    list
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("rebalancing_iter_{size}"), |b| {
            b.iter_batched(
                || {
                    let mut list = PowerList::new();
                    list.extend(0..size);
                    list
                },
                |mut list| {
                    black_box(list.rebalancing_iter().sum::<i32>());
                    list
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("power_list_iteration");

    let set: BTreeSet<i32> = (0..10_000).collect();
    group.bench_function("std_btreeset_iter", |b| {
        b.iter(|| black_box(set.iter().sum::<i32>()));
    });

    let list = PowerList::from_sorted(0..10_000).unwrap();
    group.bench_function("power_list_iter", |b| {
        b.iter(|| black_box(list.iter().sum::<i32>()));
    });

    group.finish();
}

criterion_group!(benches, bench_power_list, bench_rebalance, bench_iteration);
criterion_main!(benches);
