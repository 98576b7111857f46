//! Momentum with a drawdown circuit breaker.
//!
//! Base rule is trailing momentum: long while the lookback return is
//! positive. A circuit breaker overrides the rule: once price has fallen more
//! than `max_drawdown` from its rolling high the strategy stands aside, and
//! only re-arms after price recovers to within `rearm_drawdown` of the high.

use std::collections::BTreeMap;

use crate::domain::{PositionSeries, Series};
use crate::indicators::rolling_max;

use super::{ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct MomentumBreaker {
    momentum_window: usize,
    drawdown_window: usize,
    max_drawdown: f64,
    rearm_drawdown: f64,
}

impl MomentumBreaker {
    pub fn new(
        momentum_window: usize,
        drawdown_window: usize,
        max_drawdown: f64,
        rearm_drawdown: f64,
    ) -> Result<Self, ParamError> {
        if momentum_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "momentum_breaker",
                name: "momentum_window",
                value: momentum_window,
            });
        }
        if drawdown_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "momentum_breaker",
                name: "drawdown_window",
                value: drawdown_window,
            });
        }
        if max_drawdown <= 0.0 {
            return Err(ParamError::NonPositive {
                strategy: "momentum_breaker",
                name: "max_drawdown",
                value: max_drawdown,
            });
        }
        if rearm_drawdown <= 0.0 || rearm_drawdown >= max_drawdown {
            return Err(ParamError::ThresholdOrder {
                strategy: "momentum_breaker",
                entry: rearm_drawdown,
                exit: max_drawdown,
            });
        }
        Ok(Self {
            momentum_window,
            drawdown_window,
            max_drawdown,
            rearm_drawdown,
        })
    }

    pub fn default_params() -> Self {
        Self {
            momentum_window: 20,
            drawdown_window: 60,
            max_drawdown: 0.15,
            rearm_drawdown: 0.05,
        }
    }
}

impl Strategy for MomentumBreaker {
    fn name(&self) -> &str {
        "momentum_breaker"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("momentum_window".to_string(), self.momentum_window as f64),
            ("drawdown_window".to_string(), self.drawdown_window as f64),
            ("max_drawdown".to_string(), self.max_drawdown),
            ("rearm_drawdown".to_string(), self.rearm_drawdown),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.momentum_window.max(self.drawdown_window)
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let closes = series.closes();
        let highs = rolling_max(&closes, self.drawdown_window);
        let mut tripped = false;
        let mut signals = Vec::with_capacity(closes.len());

        for i in 0..closes.len() {
            // Breaker state advances even on bars where momentum is unknown.
            if !highs[i].is_nan() && highs[i] > 0.0 {
                let drawdown = closes[i] / highs[i] - 1.0;
                if drawdown < -self.max_drawdown {
                    tripped = true;
                } else if drawdown > -self.rearm_drawdown {
                    tripped = false;
                }
            }

            let long = if tripped || i < self.momentum_window {
                false
            } else {
                let base = closes[i - self.momentum_window];
                base > 0.0 && closes[i] / base - 1.0 > 0.0
            };
            signals.push(if long { 1.0 } else { 0.0 });
        }
        Ok(PositionSeries::try_new(signals)?)
    }
}
