//! Data source abstraction and structured error types.
//!
//! The `MarketDataSource` trait abstracts over upstream feeds (HTTP JSON,
//! seeded synthetic) so the provider and tests can swap implementations. The
//! cache layer sits above this trait; sources know nothing about it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use alphalab_core::domain::{AdjustMode, Frequency};

/// Raw daily OHLCV row from a source, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl RawBar {
    /// Rows missing any price column are rejected during normalization.
    pub fn has_complete_prices(&self) -> bool {
        !(self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan())
    }
}

/// One quarterly fundamental disclosure. `effective_date` is the first day
/// the disclosure was public knowledge; the as-of join keys on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub effective_date: NaiveDate,
    pub eps: f64,
    pub book_value_per_share: f64,
    pub roe: f64,
    pub revenue_growth: f64,
    pub debt_to_assets: f64,
    pub dividend_per_share: f64,
    pub shares_outstanding: f64,
}

/// Everything needed to identify one series request. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesQuery {
    pub symbol: String,
    pub frequency: Frequency,
    pub adjust: AdjustMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesQuery {
    pub fn daily(
        symbol: impl Into<String>,
        adjust: AdjustMode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            frequency: Frequency::Daily,
            adjust,
            start,
            end,
        }
    }

    /// Deterministic 16-hex-char key for cache filenames.
    pub fn cache_key(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}",
            self.symbol,
            self.frequency.as_str(),
            self.adjust.as_str(),
            self.start,
            self.end
        );
        blake3::hash(canonical.as_bytes()).to_hex()[..16].to_string()
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data available for '{symbol}' after exhausting retries")]
    Unavailable { symbol: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    Format(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("parquet I/O error: {0}")]
    Parquet(String),
}

/// Upstream feed for one symbol universe.
///
/// Bars and fundamentals are hard requirements; index bars feed the
/// best-effort index-trend enrichment and may fail without failing the call.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name for logs and cache metadata.
    fn name(&self) -> &str;

    /// Daily (or resampled) OHLCV bars for the query window.
    fn fetch_bars(&self, query: &SeriesQuery) -> Result<Vec<RawBar>, DataError>;

    /// Quarterly fundamental disclosures for the symbol, any order.
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Vec<FundamentalSnapshot>, DataError>;

    /// Benchmark index bars covering the window, for regime enrichment.
    fn fetch_index_bars(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<RawBar>, DataError>;
}
