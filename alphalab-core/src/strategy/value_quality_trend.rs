//! Value and quality gating over a trend rule.
//!
//! Three gates must all pass: valuation (PE positive and below a ceiling),
//! quality (ROE at or above a floor), and trend (close above its SMA). The
//! fundamental gates use the bar's enrichment columns, which the provider
//! fills with as-of values.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::sma;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct ValueQualityTrend {
    max_pe: f64,
    min_roe: f64,
    trend_window: usize,
}

impl ValueQualityTrend {
    pub fn new(max_pe: f64, min_roe: f64, trend_window: usize) -> Result<Self, ParamError> {
        if max_pe <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "value_quality_trend",
                name: "max_pe",
                value: max_pe,
            });
        }
        if trend_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "value_quality_trend",
                name: "trend_window",
                value: trend_window,
            });
        }
        Ok(Self {
            max_pe,
            min_roe,
            trend_window,
        })
    }

    pub fn default_params() -> Self {
        Self {
            max_pe: 30.0,
            min_roe: 0.10,
            trend_window: 20,
        }
    }
}

impl Strategy for ValueQualityTrend {
    fn name(&self) -> &str {
        "value_quality_trend"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("max_pe".to_string(), self.max_pe),
            ("min_roe".to_string(), self.min_roe),
            ("trend_window".to_string(), self.trend_window as f64),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.trend_window
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let trend = sma(&closes, self.trend_window);
        let bars = series.bars();
        let signals = binary_signals(bars.len(), |i| {
            if trend[i].is_nan() {
                return None;
            }
            let bar = &bars[i];
            let value_ok = bar.pe > 0.0 && bar.pe <= self.max_pe;
            let quality_ok = bar.roe >= self.min_roe;
            Some(value_ok && quality_ok && closes[i] > trend[i])
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    use crate::domain::Bar;

    fn rising_series(pe: f64, roe: f64, len: usize) -> Series {
        let bars = (0..len)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(Days::new(i as u64))
                    .unwrap();
                let close = 100.0 + i as f64;
                let mut bar =
                    Bar::ohlcv(date, close, close * 1.01, close * 0.99, close, 1_000_000);
                bar.pe = pe;
                bar.roe = roe;
                bar
            })
            .collect();
        Series::daily("TEST", bars).unwrap()
    }

    #[test]
    fn cheap_quality_uptrend_goes_long() {
        let series = rising_series(15.0, 0.2, 40);
        let strategy = ValueQualityTrend::new(30.0, 0.10, 10).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.values()[39], 1.0);
    }

    #[test]
    fn expensive_stock_is_filtered() {
        let series = rising_series(50.0, 0.2, 40);
        let strategy = ValueQualityTrend::new(30.0, 0.10, 10).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn negative_earnings_are_filtered() {
        let series = rising_series(-12.0, 0.2, 40);
        let strategy = ValueQualityTrend::new(30.0, 0.10, 10).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn weak_roe_is_filtered() {
        let series = rising_series(15.0, 0.02, 40);
        let strategy = ValueQualityTrend::new(30.0, 0.10, 10).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }
}
