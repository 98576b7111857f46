//! MACD: fast EMA minus slow EMA, with a signal EMA over the difference.

use super::ema;

/// MACD line and its signal line, aligned with the input.
#[derive(Debug, Clone)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Standard MACD with EMA spans `fast`, `slow` and `signal`.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);
    MacdLines {
        macd: macd_line,
        signal: signal_line,
    }
}
