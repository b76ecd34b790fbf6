//! Benchmarks comparing the scalar and bulk metric paths.

#![allow(
    clippy::min_ident_chars,
    clippy::unwrap_used,
    missing_docs,
    reason = "Benchmarks use standard loop variables"
)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rankeval_benchmarks_criterion::synthetic_run;
use rankeval_core::Strategy;
use rankeval_metrics::{MetricParams, RunEvaluator, lookup};
use std::hint::black_box;
use std::time::Duration;

fn bench_evaluator_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_evaluator");
    for users in [100, 1000] {
        let (recs, truth) = synthetic_run(users, 100).unwrap();
        group.throughput(Throughput::Elements(users as u64));
        for strategy in [Strategy::Bulk, Strategy::Scalar] {
            let evaluator = RunEvaluator::default().with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), users),
                &(&recs, &truth),
                |b, &(recs, truth)| {
                    b.iter(|| evaluator.evaluate(black_box(recs), black_box(truth)));
                },
            );
        }
    }
    group.finish();
}

fn bench_rbp_cutoffs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_rbp");
    let (recs, truth) = synthetic_run(1000, 1000).unwrap();
    let rbp = lookup("rbp").unwrap();
    for cutoff in [10, 100, 1000] {
        let params = MetricParams::at(cutoff);
        group.bench_with_input(BenchmarkId::from_parameter(cutoff), &params, |b, params| {
            b.iter(|| (rbp.bulk)(black_box(&recs), black_box(&truth), params));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_millis(500))
        .sample_size(10);
    targets = bench_evaluator_strategies,
             bench_rbp_cutoffs
}
criterion_main!(benches);
