//! Bollinger bands: rolling mean ± k standard deviations.

use super::sma;

/// Middle, upper and lower bands, each aligned with the input.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Rolling sample standard deviation (ddof = 1) over `period`. NaN inside the
/// warmup window; a period of 1 has zero variance everywhere.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
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
        if period == 1 {
            result[i] = 0.0;
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
        result[i] = var.sqrt();
    }
    result
}

/// Bands over `period` with `width` standard deviations.
pub fn bollinger(values: &[f64], period: usize, width: f64) -> BollingerBands {
    let middle = sma(values, period);
    let std = rolling_std(values, period);
    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m + width * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m - width * s)
        .collect();
    BollingerBands {
        middle,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn std_of_constant_is_zero() {
        let result = rolling_std(&[5.0; 6], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
        assert_approx(result[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn std_uses_sample_denominator() {
        // window [1, 2, 3]: sample variance 1.0
        let result = rolling_std(&[1.0, 2.0, 3.0], 3);
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_bracket_the_mean() {
        let values = [10.0, 12.0, 11.0, 13.0, 12.0, 14.0];
        let bands = bollinger(&values, 3, 2.0);
        for i in 2..values.len() {
            assert!(bands.upper[i] >= bands.middle[i]);
            assert!(bands.lower[i] <= bands.middle[i]);
        }
    }

    #[test]
    fn band_width_scales_with_k() {
        let values = [10.0, 12.0, 11.0, 13.0, 12.0, 14.0];
        let narrow = bollinger(&values, 3, 1.0);
        let wide = bollinger(&values, 3, 2.0);
        let i = values.len() - 1;
        let narrow_span = narrow.upper[i] - narrow.lower[i];
        let wide_span = wide.upper[i] - wide.lower[i];
        assert_approx(wide_span, 2.0 * narrow_span, DEFAULT_EPSILON);
    }
}
