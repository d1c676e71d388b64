//! Performance benchmarks for the adapters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reactive_bridge::{observable_to_store, store_to_observable, Subject, TaskQueue, Writable};
use std::sync::Arc;

/// Benchmark store writes with varying subscriber counts
fn bench_store_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_set");

    for subscribers in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let store = Writable::new(0u64);
                let _guards: Vec<_> = (0..count)
                    .map(|_| store.subscribe(|v| {
                        black_box(v);
                    }))
                    .collect();

                let mut i = 0u64;
                b.iter(|| {
                    i += 1;
                    store.set(i);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a subject feeding the value/error store pair
fn bench_subject_to_store(c: &mut Criterion) {
    c.bench_function("subject_to_store_next", |b| {
        let subject = Subject::<u64, String>::new();
        let stores = observable_to_store(&subject.observable(), Arc::new(TaskQueue::new()));
        let _unsub = stores.value.subscribe(|v| {
            black_box(v);
        });

        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            subject.next(i);
        });
    });
}

/// Benchmark teardown/rebuild churn within one tick
fn bench_reattach_churn(c: &mut Criterion) {
    c.bench_function("reattach_churn", |b| {
        let queue = Arc::new(TaskQueue::new());
        let origin = Writable::new(0u64);
        let stream = store_to_observable::<_, String, _>(&origin);
        let stores = observable_to_store(&stream, queue.clone());

        b.iter(|| {
            let unsub = stores.value.subscribe(|_| {});
            unsub.unsubscribe();
            let unsub = stores.value.subscribe(|_| {});
            queue.run_pending();
            unsub.unsubscribe();
            queue.run_pending();
        });
    });
}

criterion_group!(
    benches,
    bench_store_set,
    bench_subject_to_store,
    bench_reattach_churn
);
criterion_main!(benches);
