//! Aggregation benchmarks
//!
//! Sequence reductions run once per episode for every aggregated plot, on
//! sequences from a few hundred samples (short episodes) to tens of
//! thousands (long timeouts).
//!
//! Run with: cargo bench --bench aggregations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use run_plotter::aggregate::Aggregator;
use run_plotter::parse::string_to_float_list;
use run_plotter::plot::episode_array::resize_time;

const SIZES: [usize; 3] = [256, 4_096, 65_536];

fn sequence(len: usize) -> Vec<f64> {
    (0..len).map(|i| (i as f64 * 0.01).sin()).collect()
}

/// Benchmark every aggregator over growing sequences
fn bench_aggregators(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_sequence");

    for size in SIZES {
        let data = sequence(size);
        for agg in Aggregator::ALL {
            group.bench_with_input(BenchmarkId::new(agg.as_str(), size), &data, |b, data| {
                b.iter(|| agg.apply(black_box(data)));
            });
        }
    }

    group.finish();
}

/// Benchmark parsing of bracketed sequence cells
fn bench_parse_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_float_list");

    for size in SIZES {
        let values = sequence(size);
        let text = format!(
            "[{}]",
            values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| string_to_float_list(black_box(text)));
        });
    }

    group.finish();
}

/// Benchmark timestamp alignment for single-episode line plots
fn bench_resize_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_time");

    for size in SIZES {
        let time: Vec<f64> = (0..size).map(|i| 1.6e18 + i as f64 * 1e8).collect();
        let values = sequence(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| resize_time(black_box(&time), black_box(&values), 5));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregators, bench_parse_sequence, bench_resize_time);
criterion_main!(benches);
