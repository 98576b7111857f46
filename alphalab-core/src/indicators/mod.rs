//! Rolling indicator math over dense close/volume vectors.
//!
//! Convention: every function returns a vector the same length as its input,
//! with `NaN` for indices inside the warmup window. Strategies treat NaN
//! indicator values as "no signal".

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rank;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use bollinger::{bollinger, rolling_std, BollingerBands};
pub use ema::ema;
pub use macd::{macd, MacdLines};
pub use rank::{percentile_rank, rolling_max};
pub use rsi::rsi;
pub use sma::sma;
pub use volatility::{pct_change, rolling_volatility};

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}
