//! Bollinger band breakout.
//!
//! Enters when the close breaks above the upper band (volatility expansion in
//! the trend direction), exits once the close falls back below the middle
//! band.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::bollinger;

use super::{HoldState, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct BollingerBreakout {
    period: usize,
    width: f64,
}

impl BollingerBreakout {
    pub fn new(period: usize, width: f64) -> Result<Self, ParamError> {
        if period < 2 {
            return Err(ParamError::ZeroWindow {
                strategy: "bollinger_breakout",
                name: "period",
                value: period,
            });
        }
        if width <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "bollinger_breakout",
                name: "width",
                value: width,
            });
        }
        Ok(Self { period, width })
    }

    pub fn default_params() -> Self {
        Self {
            period: 20,
            width: 2.0,
        }
    }
}

impl Strategy for BollingerBreakout {
    fn name(&self) -> &str {
        "bollinger_breakout"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("period".to_string(), self.period as f64),
            ("width".to_string(), self.width),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let bands = bollinger(&closes, self.period, self.width);
        let signals = HoldState::run(closes.iter().enumerate().map(|(i, &close)| {
            if bands.upper[i].is_nan() || bands.middle[i].is_nan() {
                (false, false)
            } else {
                (close > bands.upper[i], close < bands.middle[i])
            }
        }));
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testkit::series_from_closes;

    #[test]
    fn spike_enters_and_fade_exits() {
        let mut closes: Vec<f64> = (0..30)
            .map(|i| 100.0 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        closes.extend([104.0, 106.0, 108.0]);
        closes.extend((0..12).map(|i| 106.0 - 2.0 * i as f64));

        let series = series_from_closes("TEST", &closes);
        let strategy = BollingerBreakout::new(10, 2.0).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        let values = signals.values();

        assert!(values[..30].iter().all(|v| *v == 0.0));
        assert!(values[30..33].iter().any(|v| *v == 1.0));
        assert_eq!(*values.last().unwrap(), 0.0);
    }

    #[test]
    fn quiet_market_stays_flat() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + if i % 2 == 0 { 0.2 } else { -0.2 })
            .collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = BollingerBreakout::default_params();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }
}
