//! Series — an immutable, strictly date-ordered run of bars for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

/// Bar frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Price-adjustment convention applied to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustMode {
    /// Splits/dividends rolled forward into historical prices.
    ForwardAdjusted,
    BackwardAdjusted,
    Unadjusted,
}

impl AdjustMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustMode::ForwardAdjusted => "forward_adjusted",
            AdjustMode::BackwardAdjusted => "backward_adjusted",
            AdjustMode::Unadjusted => "unadjusted",
        }
    }
}

/// Errors raised while constructing a series.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bars out of order at index {index}: {prev} then {next}")]
    OutOfOrder {
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },
    #[error("duplicate bar date at index {index}: {date}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// An ordered, gap-tolerant sequence of bars for one symbol.
///
/// Immutable after construction; `try_new` enforces strictly increasing
/// dates so strategies and the engine never need to sort or dedupe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    frequency: Frequency,
    adjust: AdjustMode,
    bars: Vec<Bar>,
}

impl Series {
    pub fn try_new(
        symbol: impl Into<String>,
        frequency: Frequency,
        adjust: AdjustMode,
        bars: Vec<Bar>,
    ) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date == pair[0].date {
                return Err(SeriesError::DuplicateDate {
                    index: i + 1,
                    date: pair[1].date,
                });
            }
            if pair[1].date < pair[0].date {
                return Err(SeriesError::OutOfOrder {
                    index: i + 1,
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            frequency,
            adjust,
            bars,
        })
    }

    /// A daily, forward-adjusted series. The common case in tests.
    pub fn daily(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        Self::try_new(symbol, Frequency::Daily, AdjustMode::ForwardAdjusted, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn adjust(&self) -> AdjustMode {
        self.adjust
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices as a dense vector, for indicator math.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes as a dense vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Content hash of the bar data, for run records and cache audits.
    ///
    /// Canonical JSON of the bars hashed with BLAKE3; stable across runs
    /// for identical data.
    pub fn dataset_hash(&self) -> String {
        let json = serde_json::to_vec(&self.bars).expect("bars must serialize");
        blake3::hash(&json).to_hex().to_string()
    }
}
