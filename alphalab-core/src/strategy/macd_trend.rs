//! MACD trend following — long while the MACD line is above its signal line.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::macd;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct MacdTrend {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdTrend {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, ParamError> {
        if signal == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "macd_trend",
                name: "signal",
                value: signal,
            });
        }
        if fast == 0 || fast >= slow {
            return Err(ParamError::WindowOrder {
                strategy: "macd_trend",
                fast,
                slow,
            });
        }
        Ok(Self { fast, slow, signal })
    }

    pub fn default_params() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Strategy for MacdTrend {
    fn name(&self) -> &str {
        "macd_trend"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast".to_string(), self.fast as f64),
            ("slow".to_string(), self.slow as f64),
            ("signal".to_string(), self.signal as f64),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.slow + self.signal
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let lines = macd(&closes, self.fast, self.slow, self.signal);
        let warmup = self.warmup_bars();
        let signals = binary_signals(closes.len(), |i| {
            // The EMAs are defined from bar 0 but carry heavy seed bias; stay
            // flat until both lines have converged.
            if i < warmup || lines.macd[i].is_nan() || lines.signal[i].is_nan() {
                return None;
            }
            Some(lines.macd[i] > lines.signal[i])
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}
