//! Trend following with volume confirmation.
//!
//! Long only when the close is above its SMA and the bar's volume exceeds a
//! multiple of average volume. The volume leg filters out drift without
//! participation.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::sma;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct VolumeTrendConfirmation {
    trend_window: usize,
    volume_window: usize,
    volume_multiple: f64,
}

impl VolumeTrendConfirmation {
    pub fn new(
        trend_window: usize,
        volume_window: usize,
        volume_multiple: f64,
    ) -> Result<Self, ParamError> {
        if trend_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "volume_trend_confirmation",
                name: "trend_window",
                value: trend_window,
            });
        }
        if volume_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "volume_trend_confirmation",
                name: "volume_window",
                value: volume_window,
            });
        }
        if volume_multiple <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "volume_trend_confirmation",
                name: "volume_multiple",
                value: volume_multiple,
            });
        }
        Ok(Self {
            trend_window,
            volume_window,
            volume_multiple,
        })
    }

    pub fn default_params() -> Self {
        Self {
            trend_window: 20,
            volume_window: 20,
            volume_multiple: 1.2,
        }
    }
}

impl Strategy for VolumeTrendConfirmation {
    fn name(&self) -> &str {
        "volume_trend_confirmation"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("trend_window".to_string(), self.trend_window as f64),
            ("volume_window".to_string(), self.volume_window as f64),
            ("volume_multiple".to_string(), self.volume_multiple),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.trend_window.max(self.volume_window)
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let volumes = series.volumes();
        let trend = sma(&closes, self.trend_window);
        let avg_volume = sma(&volumes, self.volume_window);
        let signals = binary_signals(closes.len(), |i| {
            if trend[i].is_nan() || avg_volume[i].is_nan() {
                return None;
            }
            Some(closes[i] > trend[i] && volumes[i] > avg_volume[i] * self.volume_multiple)
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}
