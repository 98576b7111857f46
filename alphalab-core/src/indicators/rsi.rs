//! Relative strength index from rolling mean gains and losses.
//!
//! This is the plain rolling-mean variant, not Wilder smoothing: average gain
//! and average loss are simple means over the lookback window of one-bar
//! differences. With no losses in the window RSI saturates at 100; a window
//! with neither gains nor losses yields NaN.

/// RSI over `period`. First valid value at index `period` (the first
/// difference is undefined).
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return result;
    }

    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let delta = values[i] - values[i - 1];
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    for i in period..n {
        let gain_window = &gains[(i + 1 - period)..=i];
        let loss_window = &losses[(i + 1 - period)..=i];
        if gain_window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let avg_gain = gain_window.iter().sum::<f64>() / period as f64;
        let avg_loss = loss_window.iter().sum::<f64>() / period as f64;
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                // Flat window: relative strength is undefined.
                continue;
            }
            result[i] = 100.0;
            continue;
        }
        let rs = avg_gain / avg_loss;
        result[i] = 100.0 - 100.0 / (1.0 + rs);
    }
    result
}
