//! Interval accumulator insertion benchmark
//!
//! Covers the two shapes seen in real traces: many short disjoint spans
//! (RPCs issued back to back) and heavily overlapping spans (parallel
//! resource registrations).
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench interval_accumulator
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trace_tool::intervals::{Interval, IntervalAccumulator};

fn disjoint(n: i64) -> Vec<Interval<i64>> {
    (0..n).map(|i| Interval::new(i * 10, i * 10 + 5)).collect()
}

fn overlapping(n: i64) -> Vec<Interval<i64>> {
    // pseudo-random starts, long enough to overlap several neighbours
    (0..n)
        .map(|i| {
            let start = (i * 7919) % (n * 4);
            Interval::new(start, start + 20)
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator_insert");

    for size in [100i64, 1_000, 10_000] {
        for (shape, intervals) in [("disjoint", disjoint(size)), ("overlapping", overlapping(size))] {
            group.bench_with_input(BenchmarkId::new(shape, size), &intervals, |b, intervals| {
                b.iter(|| {
                    let mut acc = IntervalAccumulator::new();
                    for interval in intervals {
                        let _ = acc.insert(black_box(*interval));
                    }
                    black_box(acc.total_duration())
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert);
criterion_main!(benches);
