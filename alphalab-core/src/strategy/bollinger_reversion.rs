//! Bollinger band mean reversion.
//!
//! Enters when the close pierces the lower band, exits once the close has
//! recovered to the middle band.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::bollinger;

use super::{HoldState, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    period: usize,
    width: f64,
}

impl BollingerReversion {
    pub fn new(period: usize, width: f64) -> Result<Self, ParamError> {
        if period < 2 {
            return Err(ParamError::ZeroWindow {
                strategy: "bollinger_reversion",
                name: "period",
                value: period,
            });
        }
        if width <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "bollinger_reversion",
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

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        "bollinger_reversion"
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
            if bands.lower[i].is_nan() || bands.middle[i].is_nan() {
                (false, false)
            } else {
                (close < bands.lower[i], close >= bands.middle[i])
            }
        }));
        Ok(PositionSeries::try_new(signals)?)
    }
}
