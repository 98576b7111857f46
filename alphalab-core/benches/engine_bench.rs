//! Engine throughput benchmarks: signal generation plus simulation over a
//! multi-year daily series.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use alphalab_core::domain::{Bar, Series};
use alphalab_core::engine::{CostModel, SimulationEngine};
use alphalab_core::strategy::StrategyRegistry;

fn synthetic_series(len: usize) -> Series {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let mut close = 100.0f64;
    let bars = (0..len)
        .map(|i| {
            // Deterministic pseudo-random walk, no RNG dependency in benches.
            let wiggle = ((i as f64 * 0.7).sin() + (i as f64 * 0.13).cos()) * 0.01;
            close *= 1.0002 + wiggle;
            let date = start.checked_add_days(Days::new(i as u64)).unwrap();
            Bar::ohlcv(date, close, close * 1.01, close * 0.99, close, 1_000_000)
        })
        .collect();
    Series::daily("BENCH", bars).unwrap()
}

fn bench_single_run(c: &mut Criterion) {
    let series = synthetic_series(2_500);
    let registry = StrategyRegistry::with_builtins();
    let strategy = registry.build_default("ma_crossover").unwrap();
    let engine = SimulationEngine::new(CostModel::default(), 100_000.0).unwrap();

    c.bench_function("ma_crossover_10y_daily", |b| {
        b.iter(|| {
            let signals = strategy.generate_signals(black_box(&series)).unwrap();
            let result = engine.run(&series, &signals).unwrap();
            black_box(alphalab_core::analytics::compute_metrics(&result));
        })
    });
}

fn bench_full_catalog(c: &mut Criterion) {
    let series = synthetic_series(2_500);
    let registry = StrategyRegistry::with_builtins();
    let engine = SimulationEngine::new(CostModel::default(), 100_000.0).unwrap();
    let params = BTreeMap::new();

    c.bench_function("full_catalog_10y_daily", |b| {
        b.iter(|| {
            for name in registry.names() {
                let strategy = registry.build(&name, &params).unwrap();
                let signals = strategy.generate_signals(black_box(&series)).unwrap();
                let result = engine.run(&series, &signals).unwrap();
                black_box(alphalab_core::analytics::compute_metrics(&result));
            }
        })
    });
}

criterion_group!(benches, bench_single_run, bench_full_catalog);
criterion_main!(benches);
