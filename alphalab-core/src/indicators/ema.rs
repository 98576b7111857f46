//! Exponentially weighted moving average.
//!
//! Span-parameterized recursion seeded at the first value:
//! `ema[0] = v[0]`, `ema[t] = alpha * v[t] + (1 - alpha) * ema[t-1]`,
//! `alpha = 2 / (span + 1)`. No warmup NaNs — defined from index 0.

/// Span-based EMA of `values`.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 || span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[0];
    result[0] = prev;
    for i in 1..n {
        if values[i].is_nan() {
            // A NaN input poisons the recursion from here on.
            for slot in result.iter_mut().skip(i) {
                *slot = f64::NAN;
            }
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}
