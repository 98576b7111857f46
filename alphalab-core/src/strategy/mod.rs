//! Strategy layer — turns a price series into a target exposure series.
//!
//! Strategies are pure market-timing logic: they read only the bars they are
//! given and must never peek at simulation state (equity, costs, fills). The
//! signal at bar `t` may use data up to and including bar `t`; the engine
//! applies the one-bar execution delay, not the strategy.

pub mod hold_state;
pub mod registry;

pub mod bollinger_breakout;
pub mod bollinger_reversion;
pub mod factor_score;
pub mod ma_crossover;
pub mod macd_trend;
pub mod momentum_breaker;
pub mod rsi_reversion;
pub mod trend_momentum_combo;
pub mod value_quality_trend;
pub mod vol_regime;
pub mod vol_target;
pub mod volume_trend_confirmation;

pub use hold_state::HoldState;
pub use registry::{StrategyFactory, StrategyRegistry};

pub use bollinger_breakout::BollingerBreakout;
pub use bollinger_reversion::BollingerReversion;
pub use factor_score::FactorScore;
pub use ma_crossover::MaCrossover;
pub use macd_trend::MacdTrend;
pub use momentum_breaker::MomentumBreaker;
pub use rsi_reversion::RsiReversion;
pub use trend_momentum_combo::TrendMomentumCombo;
pub use value_quality_trend::ValueQualityTrend;
pub use vol_regime::VolRegime;
pub use vol_target::VolTarget;
pub use volume_trend_confirmation::VolumeTrendConfirmation;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::{PositionError, PositionSeries, Series};

// ─── Error types ─────────────────────────────────────────────────────

/// Rejected strategy parameterization.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("{strategy}: {name} must be >= 1, got {value}")]
    ZeroWindow {
        strategy: &'static str,
        name: &'static str,
        value: usize,
    },
    #[error("{strategy}: fast window {fast} must be shorter than slow window {slow}")]
    WindowOrder {
        strategy: &'static str,
        fast: usize,
        slow: usize,
    },
    #[error("{strategy}: {name} must be positive, got {value}")]
    NonPositive {
        strategy: &'static str,
        name: &'static str,
        value: f64,
    },
    #[error("{strategy}: entry threshold {entry} must be below exit threshold {exit}")]
    ThresholdOrder {
        strategy: &'static str,
        entry: f64,
        exit: f64,
    },
}

/// Signal generation failure.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error(transparent)]
    InvalidPosition(#[from] PositionError),
}

// ─── Strategy trait ──────────────────────────────────────────────────

/// A single-asset timing rule producing one target exposure per bar.
///
/// # Invariants
/// - `generate_signals` is deterministic for the same series.
/// - The output has exactly one value per input bar, each in [0, 1].
/// - The value at index `t` uses data up to and including bar `t`; the
///   one-bar execution delay is the engine's job.
/// - A series shorter than `warmup_bars()` yields an all-flat output, not an
///   error.
pub trait Strategy: std::fmt::Debug + Send + Sync {
    /// Registry key, stable across runs. Snake case.
    fn name(&self) -> &str;

    /// Effective parameterization, for run manifests and result files.
    fn params(&self) -> BTreeMap<String, f64>;

    /// Bars consumed before the first non-flat signal can appear.
    fn warmup_bars(&self) -> usize;

    /// Target exposure per bar, aligned with `series.bars()`.
    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError>;
}

// ─── Shared helpers ──────────────────────────────────────────────────

/// Binary long/flat mapping: 1.0 where `condition` holds and no input is NaN.
pub(crate) fn binary_signals<F>(len: usize, condition: F) -> Vec<f64>
where
    F: Fn(usize) -> Option<bool>,
{
    (0..len)
        .map(|i| match condition(i) {
            Some(true) => 1.0,
            _ => 0.0,
        })
        .collect()
}
