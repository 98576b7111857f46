//! Rolling extremes and trailing percentile rank.

/// Rolling maximum over `period`. NaN inside the warmup window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().copied().fold(f64::MIN, f64::max);
    }
    result
}

/// Fraction of the trailing `window` values (current bar included) that are
/// less than or equal to the current value. Range (0, 1]; NaN until a full
/// window of non-NaN values is available.
pub fn percentile_rank(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let current = values[i];
        let below = slice.iter().filter(|&&v| v <= current).count();
        result[i] = below as f64 / window as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_max_tracks_peak() {
        let values = [3.0, 5.0, 4.0, 2.0, 6.0];
        let result = rolling_max(&values, 3);
        assert!(result[1].is_nan());
        assert_approx(result[2], 5.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
        assert_approx(result[4], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rank_of_window_high_is_one() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = percentile_rank(&values, 4);
        assert_approx(result[4], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rank_of_window_low_is_one_over_window() {
        let values = [5.0, 4.0, 3.0, 2.0, 1.0];
        let result = percentile_rank(&values, 4);
        assert_approx(result[4], 0.25, DEFAULT_EPSILON);
    }

    #[test]
    fn rank_warmup_is_nan() {
        let result = percentile_rank(&[1.0, 2.0, 3.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(!result[2].is_nan());
    }
}
