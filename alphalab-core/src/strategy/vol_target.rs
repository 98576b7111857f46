//! Volatility targeting — graded exposure scaled to realized volatility.
//!
//! Exposure is `target_vol / realized_vol`, clamped to [0, 1]. Calm markets
//! run fully invested, turbulent markets are scaled down proportionally. This
//! is the one built-in strategy that emits fractional positions.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::rolling_volatility;

use super::{ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct VolTarget {
    vol_window: usize,
    target_vol: f64,
}

impl VolTarget {
    pub fn new(vol_window: usize, target_vol: f64) -> Result<Self, ParamError> {
        if vol_window < 2 {
            return Err(ParamError::ZeroWindow {
                strategy: "vol_target",
                name: "vol_window",
                value: vol_window,
            });
        }
        if target_vol <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "vol_target",
                name: "target_vol",
                value: target_vol,
            });
        }
        Ok(Self {
            vol_window,
            target_vol,
        })
    }

    pub fn default_params() -> Self {
        Self {
            vol_window: 20,
            target_vol: 0.01,
        }
    }
}

impl Strategy for VolTarget {
    fn name(&self) -> &str {
        "vol_target"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("vol_window".to_string(), self.vol_window as f64),
            ("target_vol".to_string(), self.target_vol),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.vol_window + 1
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let realized = rolling_volatility(&closes, self.vol_window);
        let signals = realized
            .iter()
            .map(|&vol| {
                if vol.is_nan() {
                    0.0
                } else if vol == 0.0 {
                    // No measurable risk: run at full size.
                    1.0
                } else {
                    (self.target_vol / vol).clamp(0.0, 1.0)
                }
            })
            .collect();
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testkit::series_from_closes;

    #[test]
    fn calm_market_runs_full_size() {
        // Tiny steady drift: realized vol well below target.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.0001f64.powi(i)).collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = VolTarget::new(10, 0.01).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.values()[39], 1.0);
    }

    #[test]
    fn wild_market_is_scaled_down() {
        let closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 100.0 } else { 108.0 })
            .collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = VolTarget::new(10, 0.01).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        let last = *signals.values().last().unwrap();
        assert!(last > 0.0 && last < 0.5);
    }

    #[test]
    fn warmup_is_flat() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = VolTarget::new(10, 0.01).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        for v in &signals.values()[..10] {
            assert_eq!(*v, 0.0);
        }
    }

    #[test]
    fn exposure_never_leaves_unit_interval() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0)
            .collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = VolTarget::default_params();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
