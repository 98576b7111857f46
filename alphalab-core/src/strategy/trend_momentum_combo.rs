//! Trend filter plus momentum confirmation.
//!
//! Long only when the close sits above its slow SMA AND trailing momentum
//! over the lookback window is positive. Either leg failing drops the
//! position.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::sma;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct TrendMomentumCombo {
    trend_window: usize,
    momentum_window: usize,
}

impl TrendMomentumCombo {
    pub fn new(trend_window: usize, momentum_window: usize) -> Result<Self, ParamError> {
        if trend_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "trend_momentum_combo",
                name: "trend_window",
                value: trend_window,
            });
        }
        if momentum_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "trend_momentum_combo",
                name: "momentum_window",
                value: momentum_window,
            });
        }
        Ok(Self {
            trend_window,
            momentum_window,
        })
    }

    pub fn default_params() -> Self {
        Self {
            trend_window: 30,
            momentum_window: 20,
        }
    }
}

impl Strategy for TrendMomentumCombo {
    fn name(&self) -> &str {
        "trend_momentum_combo"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("trend_window".to_string(), self.trend_window as f64),
            ("momentum_window".to_string(), self.momentum_window as f64),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.trend_window.max(self.momentum_window)
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let trend = sma(&closes, self.trend_window);
        let signals = binary_signals(closes.len(), |i| {
            if trend[i].is_nan() || i < self.momentum_window {
                return None;
            }
            let base = closes[i - self.momentum_window];
            if base <= 0.0 {
                return None;
            }
            let momentum = closes[i] / base - 1.0;
            Some(closes[i] > trend[i] && momentum > 0.0)
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}
