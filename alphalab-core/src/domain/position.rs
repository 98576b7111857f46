//! PositionSeries — target fractional exposure per bar, validated to [0, 1].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a strategy emits an invalid position series.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("position {value} at index {index} outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },
    #[error("position at index {index} is NaN")]
    NotANumber { index: usize },
}

/// One target exposure per bar: 0 = flat, 1 = fully invested, values in
/// between are graded sizing. Same length and order as the series it was
/// generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSeries(Vec<f64>);

impl PositionSeries {
    /// Validate and wrap raw target positions.
    pub fn try_new(values: Vec<f64>) -> Result<Self, PositionError> {
        for (index, &value) in values.iter().enumerate() {
            if value.is_nan() {
                return Err(PositionError::NotANumber { index });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(PositionError::OutOfRange { index, value });
            }
        }
        Ok(Self(values))
    }

    /// An all-flat series of the given length.
    pub fn flat(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_positions() {
        let p = PositionSeries::try_new(vec![0.0, 0.5, 1.0]).unwrap();
        assert_eq!(p.values(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn rejects_above_one() {
        let err = PositionSeries::try_new(vec![0.0, 1.5]).unwrap_err();
        assert!(matches!(err, PositionError::OutOfRange { index: 1, .. }));
    }

    #[test]
    fn rejects_negative() {
        let err = PositionSeries::try_new(vec![-0.1]).unwrap_err();
        assert!(matches!(err, PositionError::OutOfRange { index: 0, .. }));
    }

    #[test]
    fn rejects_nan() {
        let err = PositionSeries::try_new(vec![f64::NAN]).unwrap_err();
        assert!(matches!(err, PositionError::NotANumber { index: 0 }));
    }

    #[test]
    fn flat_is_all_zero() {
        let p = PositionSeries::flat(4);
        assert_eq!(p.values(), &[0.0; 4]);
    }

    #[test]
    fn empty_is_valid() {
        let p = PositionSeries::try_new(vec![]).unwrap();
        assert!(p.is_empty());
    }
}
