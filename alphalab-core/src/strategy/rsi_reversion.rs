//! RSI mean reversion — buy oversold, hold until overbought.
//!
//! Enters when RSI drops below the oversold threshold and keeps the position
//! until RSI rises above the overbought threshold. NaN RSI never triggers a
//! transition in either direction.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::rsi;

use super::{HoldState, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct RsiReversion {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiReversion {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Result<Self, ParamError> {
        if period == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "rsi_reversion",
                name: "period",
                value: period,
            });
        }
        if oversold >= overbought {
            return Err(ParamError::ThresholdOrder {
                strategy: "rsi_reversion",
                entry: oversold,
                exit: overbought,
            });
        }
        Ok(Self {
            period,
            oversold,
            overbought,
        })
    }

    pub fn default_params() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("oversold".to_string(), self.oversold),
            ("overbought".to_string(), self.overbought),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let rsi_values = rsi(&closes, self.period);
        let signals = HoldState::run(rsi_values.iter().map(|&r| {
            if r.is_nan() {
                (false, false)
            } else {
                (r < self.oversold, r > self.overbought)
            }
        }));
        Ok(PositionSeries::try_new(signals)?)
    }
}
