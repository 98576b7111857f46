//! Volatility regime switch.
//!
//! Reads the provider's per-bar volatility estimate and splits the market
//! into a calm and a stressed regime. In the calm regime the strategy runs a
//! simple trend rule at full size; in the stressed regime it falls back to a
//! reduced defensive exposure.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::sma;

use super::{ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct VolRegime {
    trend_window: usize,
    vol_threshold: f64,
    defensive_exposure: f64,
}

impl VolRegime {
    pub fn new(
        trend_window: usize,
        vol_threshold: f64,
        defensive_exposure: f64,
    ) -> Result<Self, ParamError> {
        if trend_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "vol_regime",
                name: "trend_window",
                value: trend_window,
            });
        }
        if vol_threshold <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "vol_regime",
                name: "vol_threshold",
                value: vol_threshold,
            });
        }
        if !(0.0..=1.0).contains(&defensive_exposure) {
            return Err(ParamError::NonPositive {
                strategy: "vol_regime",
                name: "defensive_exposure",
                value: defensive_exposure,
            });
        }
        Ok(Self {
            trend_window,
            vol_threshold,
            defensive_exposure,
        })
    }

    pub fn default_params() -> Self {
        Self {
            trend_window: 20,
            vol_threshold: 0.03,
            defensive_exposure: 0.3,
        }
    }
}

impl Strategy for VolRegime {
    fn name(&self) -> &str {
        "vol_regime"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("trend_window".to_string(), self.trend_window as f64),
            ("vol_threshold".to_string(), self.vol_threshold),
            ("defensive_exposure".to_string(), self.defensive_exposure),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.trend_window
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let trend = sma(&closes, self.trend_window);
        let signals = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                if trend[i].is_nan() || closes[i] <= trend[i] {
                    return 0.0;
                }
                if bar.volatility > self.vol_threshold {
                    self.defensive_exposure
                } else {
                    1.0
                }
            })
            .collect();
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    use crate::domain::Bar;

    fn rising_series_with_vol(vols: &[f64]) -> Series {
        let bars = vols
            .iter()
            .enumerate()
            .map(|(i, &vol)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(Days::new(i as u64))
                    .unwrap();
                let close = 100.0 + i as f64;
                let mut bar = Bar::ohlcv(date, close, close * 1.01, close * 0.99, close, 1_000_000);
                bar.volatility = vol;
                bar
            })
            .collect();
        Series::daily("TEST", bars).unwrap()
    }

    #[test]
    fn calm_uptrend_is_fully_invested() {
        let series = rising_series_with_vol(&[0.01; 40]);
        let strategy = VolRegime::new(10, 0.03, 0.3).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.values()[39], 1.0);
    }

    #[test]
    fn stressed_uptrend_is_defensive() {
        let series = rising_series_with_vol(&[0.05; 40]);
        let strategy = VolRegime::new(10, 0.03, 0.3).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.values()[39], 0.3);
    }

    #[test]
    fn downtrend_is_flat_in_any_regime() {
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(Days::new(i as u64))
                    .unwrap();
                let close = 200.0 - i as f64;
                Bar::ohlcv(date, close, close * 1.01, close * 0.99, close, 1_000_000)
            })
            .collect();
        let series = Series::daily("TEST", bars).unwrap();
        let strategy = VolRegime::new(10, 0.03, 0.3).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }
}
