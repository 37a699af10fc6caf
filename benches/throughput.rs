//! Push/TryPop throughput under contention. Diagnostic only, not part of
//! the correctness suite (SPEC_FULL.md §8 "Expansion — test tooling").

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cslpq::Queue;

fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");

    group.bench_function("push_10000", |b| {
        b.iter(|| {
            let queue: Queue<u64> = Queue::new(6);
            for i in 0..10_000u64 {
                queue.push(black_box(i));
            }
        });
    });

    group.bench_function("push_then_pop_10000", |b| {
        b.iter(|| {
            let queue: Queue<u64> = Queue::new(6);
            for i in 0..10_000u64 {
                queue.push(black_box(i));
            }
            while queue.try_pop().is_some() {}
        });
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");

    for producers in [1usize, 2, 4, 8] {
        group.bench_function(format!("producers_{producers}_push_10000_each"), |b| {
            b.iter(|| {
                let queue: Queue<u64> = Queue::new(6);
                crossbeam_utils::thread::scope(|scope| {
                    for p in 0..producers {
                        let queue = &queue;
                        scope.spawn(move |_| {
                            for i in 0..10_000u64 {
                                queue.push(black_box(p as u64 * 10_000 + i));
                            }
                        });
                    }
                })
                .unwrap();
            });
        });
    }

    group.bench_function("producers_4_consumers_4", |b| {
        b.iter(|| {
            let queue: Queue<u64> = Queue::new(6);
            let total = 4 * 10_000u64;
            let popped = std::sync::atomic::AtomicU64::new(0);
            let popped = &popped;
            crossbeam_utils::thread::scope(|scope| {
                for p in 0..4 {
                    let queue = &queue;
                    scope.spawn(move |_| {
                        for i in 0..10_000u64 {
                            queue.push(black_box(p * 10_000 + i));
                        }
                    });
                }
                for _ in 0..4 {
                    let queue = &queue;
                    scope.spawn(move |_| {
                        while popped.load(std::sync::atomic::Ordering::Acquire) < total {
                            if queue.try_pop().is_some() {
                                popped.fetch_add(1, std::sync::atomic::Ordering::AcqRel);
                            }
                        }
                    });
                }
            })
            .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_threaded, bench_contended);
criterion_main!(benches);
