//! Catalog sweep: run every registered strategy against one series.
//!
//! Strategies run in parallel; one misbehaving strategy is reported as
//! skipped and never aborts the sweep. Persistence is best-effort per run.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use alphalab_core::analytics::{composite_score, compute_metrics, MetricsRecord};
use alphalab_core::domain::Series;
use alphalab_core::engine::SimulationEngine;
use alphalab_core::strategy::StrategyRegistry;

use crate::persistence::{DataDescriptor, RunStore};

/// Shortest history a sweep will accept. Below this the longest warmup
/// windows in the catalog leave too few tradable bars for the metrics to
/// mean anything.
pub const MIN_SWEEP_BARS: usize = 60;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("insufficient history: {bars} bars, sweep requires at least {required}")]
    InsufficientHistory { bars: usize, required: usize },
}

// ─── Report types ────────────────────────────────────────────────────

/// One strategy that completed its backtest.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub name: String,
    pub parameters: BTreeMap<String, f64>,
    pub metrics: MetricsRecord,
    pub score: f64,
}

/// One strategy that failed to build or simulate.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedStrategy {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub data: DataDescriptor,
    /// Completed strategies, best first.
    pub ranked: Vec<StrategyOutcome>,
    pub skipped: Vec<SkippedStrategy>,
}

impl SweepReport {
    pub fn best(&self) -> Option<&StrategyOutcome> {
        self.ranked.first()
    }
}

// ─── Sweep ───────────────────────────────────────────────────────────

/// Run every registry entry with its default parameters over `series`.
///
/// Ranking is Sharpe descending, composite score breaking ties. When a
/// `store` is given, each completed run is persisted; a failed save is
/// logged and the sweep continues.
pub fn run_catalog(
    registry: &StrategyRegistry,
    series: &Series,
    engine: &SimulationEngine,
    store: Option<&RunStore>,
) -> Result<SweepReport, SweepError> {
    if series.len() < MIN_SWEEP_BARS {
        return Err(SweepError::InsufficientHistory {
            bars: series.len(),
            required: MIN_SWEEP_BARS,
        });
    }

    let (Some(start_date), Some(end_date)) = (series.first_date(), series.last_date()) else {
        return Err(SweepError::InsufficientHistory {
            bars: 0,
            required: MIN_SWEEP_BARS,
        });
    };
    let data = DataDescriptor {
        symbol: series.symbol().to_string(),
        frequency: series.frequency(),
        adjust: series.adjust(),
        start_date,
        end_date,
        bar_count: series.len(),
        dataset_hash: series.dataset_hash(),
    };

    let results: Vec<Result<StrategyOutcome, SkippedStrategy>> = registry
        .names()
        .par_iter()
        .map(|name| run_one(registry, series, engine, name))
        .collect();

    let mut ranked = Vec::new();
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(outcome) => ranked.push(outcome),
            Err(skip) => skipped.push(skip),
        }
    }

    if let Some(store) = store {
        for outcome in &ranked {
            if let Err(e) =
                store.save_result(&outcome.name, &outcome.parameters, &outcome.metrics, &data)
            {
                eprintln!("WARNING: failed to persist run for {}: {e}", outcome.name);
            }
        }
    }

    ranked.sort_by(|a, b| {
        b.metrics
            .sharpe
            .total_cmp(&a.metrics.sharpe)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(SweepReport {
        data,
        ranked,
        skipped,
    })
}

fn run_one(
    registry: &StrategyRegistry,
    series: &Series,
    engine: &SimulationEngine,
    name: &str,
) -> Result<StrategyOutcome, SkippedStrategy> {
    let strategy = registry.build_default(name).map_err(|e| SkippedStrategy {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let result = engine
        .run_strategy(strategy.as_ref(), series)
        .map_err(|e| SkippedStrategy {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    let metrics = compute_metrics(&result);
    let score = composite_score(&metrics);
    Ok(StrategyOutcome {
        name: name.to_string(),
        parameters: strategy.params(),
        metrics,
        score,
    })
}
