//! One-bar returns and rolling realized volatility.

use super::rolling_std;

/// One-bar simple returns: `v[t] / v[t-1] - 1`, NaN at index 0. A zero
/// previous value yields NaN rather than infinity.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in 1..n {
        let prev = values[i - 1];
        if prev == 0.0 || prev.is_nan() || values[i].is_nan() {
            continue;
        }
        result[i] = values[i] / prev - 1.0;
    }
    result
}

/// Rolling sample standard deviation of one-bar returns over `period`.
pub fn rolling_volatility(values: &[f64], period: usize) -> Vec<f64> {
    rolling_std(&pct_change(values), period)
}
