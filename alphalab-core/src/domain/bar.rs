//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Neutral default for the market-index-trend flag: neither up nor down.
pub const NEUTRAL_INDEX_TREND: f64 = 0.0;

/// Placeholder daily volatility used when no estimate can be computed.
pub const NEUTRAL_VOLATILITY: f64 = 0.02;

/// One daily OHLCV bar, optionally carrying fundamental/macro enrichment.
///
/// Prices are adjusted per the adjustment mode of the owning [`super::Series`].
/// Enrichment columns are guaranteed total by the data provider: where a value
/// is unknown it holds the documented neutral default (0.0 for valuation and
/// quality ratios, [`NEUTRAL_INDEX_TREND`], [`NEUTRAL_VOLATILITY`]), so
/// strategies never have to handle missing enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    // ── Enrichment ──
    pub pe: f64,
    pub pb: f64,
    pub roe: f64,
    pub revenue_growth: f64,
    pub debt_to_assets: f64,
    pub dividend_yield: f64,
    pub total_market_value: f64,
    /// Market-index trend flag: +1 index above its trend line, -1 below, 0 neutral.
    pub index_trend: f64,
    /// Rolling estimate of daily close-to-close volatility.
    pub volatility: f64,
}

impl Bar {
    /// A bare price bar with neutral enrichment.
    pub fn ohlcv(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            pe: 0.0,
            pb: 0.0,
            roe: 0.0,
            revenue_growth: 0.0,
            debt_to_assets: 0.0,
            dividend_yield: 0.0,
            total_market_value: 0.0,
            index_trend: NEUTRAL_INDEX_TREND,
            volatility: NEUTRAL_VOLATILITY,
        }
    }

    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= open/close >= low, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::ohlcv(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
            50_000,
        )
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn neutral_enrichment_defaults() {
        let bar = sample_bar();
        assert_eq!(bar.pe, 0.0);
        assert_eq!(bar.index_trend, NEUTRAL_INDEX_TREND);
        assert_eq!(bar.volatility, NEUTRAL_VOLATILITY);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.date, deser.date);
        assert_eq!(bar.close, deser.close);
        assert_eq!(bar.volatility, deser.volatility);
    }
}
