//! Vectorized backtest engine.
//!
//! Runs one strategy signal series against one price series. Execution is
//! delayed by one bar: the exposure held on bar `t` is the signal emitted on
//! bar `t-1`, so a strategy can never trade on the close it just observed.
//! Transaction costs are charged on every exposure change, proportional to
//! the change in size.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PositionSeries, Series};
use crate::strategy::{SignalError, Strategy};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("signal length {signals} does not match series length {bars}")]
    LengthMismatch { signals: usize, bars: usize },
    #[error("initial cash must be positive, got {0}")]
    NonPositiveCash(f64),
    #[error(transparent)]
    Signal(#[from] SignalError),
}

// ─── Cost model ──────────────────────────────────────────────────────

/// Proportional round-trip friction: each unit of exposure change pays
/// `commission_rate + slippage_rate` of notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub commission_rate: f64,
    pub slippage_rate: f64,
}

impl CostModel {
    pub fn new(commission_rate: f64, slippage_rate: f64) -> Self {
        Self {
            commission_rate,
            slippage_rate,
        }
    }

    /// Zero-friction model, for isolating strategy behavior in tests.
    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn per_unit(&self) -> f64 {
        self.commission_rate + self.slippage_rate
    }
}

impl Default for CostModel {
    /// A-share style defaults: 3bp commission, 10bp slippage per side.
    fn default() -> Self {
        Self::new(0.0003, 0.001)
    }
}

// ─── Result ──────────────────────────────────────────────────────────

/// Per-bar output of one simulation, all vectors aligned with the input
/// series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub dates: Vec<NaiveDate>,
    /// Raw target exposure the strategy emitted on each bar.
    pub signals: Vec<f64>,
    /// Exposure actually held on each bar (signals shifted by one).
    pub positions: Vec<f64>,
    /// Daily return net of costs.
    pub net_returns: Vec<f64>,
    pub equity: Vec<f64>,
    /// Fractional distance below the running equity peak, <= 0.
    pub drawdown: Vec<f64>,
    pub initial_cash: f64,
}

impl SimulationResult {
    fn empty(initial_cash: f64) -> Self {
        Self {
            dates: Vec::new(),
            signals: Vec::new(),
            positions: Vec::new(),
            net_returns: Vec::new(),
            equity: Vec::new(),
            drawdown: Vec::new(),
            initial_cash,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn final_equity(&self) -> f64 {
        self.equity.last().copied().unwrap_or(self.initial_cash)
    }

    pub fn total_return(&self) -> f64 {
        if self.initial_cash > 0.0 {
            self.final_equity() / self.initial_cash - 1.0
        } else {
            0.0
        }
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown.iter().copied().fold(0.0, f64::min)
    }

    /// Total absolute exposure change over the run.
    pub fn gross_turnover(&self) -> f64 {
        let mut prev = 0.0;
        let mut total = 0.0;
        for &p in &self.positions {
            total += (p - prev).abs();
            prev = p;
        }
        total
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// One engine instance carries the cost model and starting capital and can
/// run any number of simulations.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    costs: CostModel,
    initial_cash: f64,
}

impl SimulationEngine {
    pub fn new(costs: CostModel, initial_cash: f64) -> Result<Self, SimulationError> {
        if initial_cash <= 0.0 {
            return Err(SimulationError::NonPositiveCash(initial_cash));
        }
        Ok(Self {
            costs,
            initial_cash,
        })
    }

    pub fn costs(&self) -> CostModel {
        self.costs
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Simulate `signals` over `series`. An empty series yields an empty
    /// result rather than an error.
    pub fn run(
        &self,
        series: &Series,
        signals: &PositionSeries,
    ) -> Result<SimulationResult, SimulationError> {
        let n = series.len();
        if signals.len() != n {
            return Err(SimulationError::LengthMismatch {
                signals: signals.len(),
                bars: n,
            });
        }
        if n == 0 {
            return Ok(SimulationResult::empty(self.initial_cash));
        }

        let closes = series.closes();
        let signal_values = signals.values();

        // Held exposure: signal shifted forward one bar, flat on bar 0.
        let mut positions = Vec::with_capacity(n);
        positions.push(0.0);
        positions.extend_from_slice(&signal_values[..n - 1]);

        let per_unit_cost = self.costs.per_unit();
        let mut net_returns = Vec::with_capacity(n);
        let mut equity = Vec::with_capacity(n);
        let mut drawdown = Vec::with_capacity(n);

        let mut prev_position = 0.0;
        let mut cum = self.initial_cash;
        let mut peak = f64::MIN;

        for i in 0..n {
            let market_return = if i == 0 || closes[i - 1] <= 0.0 {
                0.0
            } else {
                closes[i] / closes[i - 1] - 1.0
            };
            let position = positions[i];
            let traded = (position - prev_position).abs();
            let net = position * market_return - traded * per_unit_cost;
            prev_position = position;

            cum *= 1.0 + net;
            peak = peak.max(cum);

            net_returns.push(net);
            equity.push(cum);
            drawdown.push(if peak > 0.0 { cum / peak - 1.0 } else { 0.0 });
        }

        Ok(SimulationResult {
            dates: series.bars().iter().map(|b| b.date).collect(),
            signals: signal_values.to_vec(),
            positions,
            net_returns,
            equity,
            drawdown,
            initial_cash: self.initial_cash,
        })
    }

    /// Generate signals for `strategy` and simulate them in one call.
    pub fn run_strategy(
        &self,
        strategy: &dyn Strategy,
        series: &Series,
    ) -> Result<SimulationResult, SimulationError> {
        let signals = strategy.generate_signals(series)?;
        self.run(series, &signals)
    }
}
