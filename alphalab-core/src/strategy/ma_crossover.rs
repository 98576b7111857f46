//! Dual moving average trend following.
//!
//! Long while the fast SMA sits above the slow SMA, flat otherwise. The
//! classic 10/30 daily configuration is the default.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::sma;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast: usize,
    slow: usize,
}

impl MaCrossover {
    pub fn new(fast: usize, slow: usize) -> Result<Self, ParamError> {
        if fast == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "ma_crossover",
                name: "fast",
                value: fast,
            });
        }
        if fast >= slow {
            return Err(ParamError::WindowOrder {
                strategy: "ma_crossover",
                fast,
                slow,
            });
        }
        Ok(Self { fast, slow })
    }

    pub fn default_params() -> Self {
        Self { fast: 10, slow: 30 }
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("fast".to_string(), self.fast as f64),
            ("slow".to_string(), self.slow as f64),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.slow
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let fast = sma(&closes, self.fast);
        let slow = sma(&closes, self.slow);
        let signals = binary_signals(closes.len(), |i| {
            if fast[i].is_nan() || slow[i].is_nan() {
                return None;
            }
            Some(fast[i] > slow[i])
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testkit::series_from_closes;

    #[test]
    fn monotone_rise_goes_long_after_warmup() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = MaCrossover::new(5, 20).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();

        let values = signals.values();
        assert_eq!(values.len(), 60);
        for v in &values[..19] {
            assert_eq!(*v, 0.0);
        }
        // Fast mean of a rising series is above the slow mean once both exist.
        for v in &values[20..] {
            assert_eq!(*v, 1.0);
        }
    }

    #[test]
    fn monotone_fall_stays_flat() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let series = series_from_closes("TEST", &closes);
        let strategy = MaCrossover::new(5, 20).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn short_series_is_all_flat() {
        let series = series_from_closes("TEST", &[100.0, 101.0, 102.0]);
        let strategy = MaCrossover::default_params();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.len(), 3);
        assert!(signals.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rejects_inverted_windows() {
        assert!(MaCrossover::new(30, 10).is_err());
        assert!(MaCrossover::new(10, 10).is_err());
        assert!(MaCrossover::new(0, 10).is_err());
    }
}
