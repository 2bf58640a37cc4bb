//! Performance benchmarks for valuation and dashboard aggregation
//!
//! Targets:
//! - Single valuation: <50µs
//! - Aggregation: linear in the number of records

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use utmi_core::{Aggregator, CoefficientTable, InteractionRecord, TreasuryAccount, ValuationEngine};

const PROMPTS: [&str; 5] = [
    "Refactor this function and explain the fix",
    "Summarize the quarterly budget for the board",
    "Translate my resume for a job interview",
    "Write a short poem about machine learning",
    "Compare these two marketing campaigns",
];

fn build_log(engine: &ValuationEngine, size: usize) -> Vec<InteractionRecord> {
    (0..size)
        .map(|i| {
            engine.process(&InteractionRecord::new(
                PROMPTS[i % PROMPTS.len()],
                "A reasonably long response with several sentences of content. Thanks!",
                (i % 30) as f64,
                if i % 2 == 0 { "gpt-4o" } else { "claude-3-5-haiku" },
            ))
        })
        .collect()
}

/// Benchmark 1: single record valuation
fn bench_valuation(c: &mut Criterion) {
    let engine = ValuationEngine::new(CoefficientTable::default()).unwrap();
    let record = InteractionRecord::new(PROMPTS[0], "Here is the refactored code.", 4.0, "gpt-4o");

    let mut group = c.benchmark_group("valuation");
    group.throughput(Throughput::Elements(1));
    group.bench_function("valuate", |b| b.iter(|| engine.valuate(black_box(&record))));
    group.bench_function("process", |b| b.iter(|| engine.process(black_box(&record))));
    group.finish();
}

/// Benchmark 2: dashboard aggregation over processed logs
fn bench_aggregation(c: &mut Criterion) {
    let engine = ValuationEngine::new(CoefficientTable::default()).unwrap();
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let aggregator = Aggregator::from_engine(engine.clone(), as_of);
    let treasury = TreasuryAccount::new().snapshot();

    let mut group = c.benchmark_group("aggregation");
    for size in [100usize, 1_000, 10_000] {
        let records = build_log(&engine, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| aggregator.aggregate(black_box(records), None, &treasury))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_valuation, bench_aggregation);
criterion_main!(benches);
