//! Benchmarks for the delay queue hot paths.
//!
//! Run with:
//! - `cargo bench --bench queue`

use std::hint::black_box;

use chrono::{TimeDelta, Utc};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use delayq::{DelayQueue, TaskFn};

fn noop() -> TaskFn {
    Box::new(|| Ok(()))
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_insert");
    group.throughput(Throughput::Elements(1));
    group.bench_function("serialized_counter", |b| {
        let queue = DelayQueue::new();
        let time = Utc::now();
        b.iter(|| {
            queue.insert(black_box(time), noop());
        });
    });
    group.finish();
}

fn bench_insert_then_drain(c: &mut Criterion) {
    let batch: usize = 1_024;
    let mut group = c.benchmark_group("queue_insert_drain");
    group.throughput(Throughput::Elements(batch as u64));
    group.bench_function("due_batch", |b| {
        b.iter_batched(
            || {
                let queue = DelayQueue::new();
                // All targets already in the past, so drain never blocks.
                let base = Utc::now() - TimeDelta::seconds(1);
                for i in 0..batch {
                    queue.insert(base + TimeDelta::microseconds(i as i64), noop());
                }
                queue
            },
            |queue| {
                while let Some(task) = queue.try_take_due() {
                    black_box(task.seq());
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_insert_then_drain);
criterion_main!(benches);
