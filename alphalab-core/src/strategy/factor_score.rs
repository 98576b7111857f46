//! Fundamental factor score with trailing percentile gating.
//!
//! Blends valuation and quality enrichment into one score per bar:
//! earnings yield (1/PE when PE is positive) plus ROE plus revenue growth
//! minus leverage. Long when the current score ranks in the top of its
//! trailing window.

use std::collections::BTreeMap;

use crate::domain::{Bar, PositionSeries, Series};
use crate::indicators::percentile_rank;

use super::{binary_signals, ParamError, SignalError, Strategy};

#[derive(Debug, Clone)]
pub struct FactorScore {
    rank_window: usize,
    min_rank: f64,
}

impl FactorScore {
    pub fn new(rank_window: usize, min_rank: f64) -> Result<Self, ParamError> {
        if rank_window == 0 {
            return Err(ParamError::ZeroWindow {
                strategy: "factor_score",
                name: "rank_window",
                value: rank_window,
            });
        }
        if min_rank <= 0.0 || min_rank > 1.0 {
            return Err(ParamError::NonPositive {
                strategy: "factor_score",
                name: "min_rank",
                value: min_rank,
            });
        }
        Ok(Self {
            rank_window,
            min_rank,
        })
    }

    pub fn default_params() -> Self {
        Self {
            rank_window: 60,
            min_rank: 0.7,
        }
    }

    fn score(bar: &Bar) -> f64 {
        let earnings_yield = if bar.pe > 0.0 { 1.0 / bar.pe } else { 0.0 };
        earnings_yield + bar.roe + bar.revenue_growth - bar.debt_to_assets
    }
}

impl Strategy for FactorScore {
    fn name(&self) -> &str {
        "factor_score"
    }

    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("rank_window".to_string(), self.rank_window as f64),
            ("min_rank".to_string(), self.min_rank),
        ])
    }

    fn warmup_bars(&self) -> usize {
        self.rank_window
    }

    fn generate_signals(&self, series: &Series) -> Result<PositionSeries, SignalError> {
        let scores: Vec<f64> = series.bars().iter().map(Self::score).collect();
        let ranks = percentile_rank(&scores, self.rank_window);
        let signals = binary_signals(scores.len(), |i| {
            if ranks[i].is_nan() {
                return None;
            }
            Some(ranks[i] >= self.min_rank)
        });
        Ok(PositionSeries::try_new(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testkit::series_from_closes;
    use chrono::{Days, NaiveDate};

    fn series_with_roe(roes: &[f64]) -> Series {
        let bars = roes
            .iter()
            .enumerate()
            .map(|(i, &roe)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(Days::new(i as u64))
                    .unwrap();
                let mut bar = Bar::ohlcv(date, 100.0, 101.0, 99.0, 100.0, 1_000_000);
                bar.roe = roe;
                bar
            })
            .collect();
        Series::daily("TEST", bars).unwrap()
    }

    #[test]
    fn improving_fundamentals_rank_high() {
        let roes: Vec<f64> = (0..30).map(|i| 0.05 + 0.005 * i as f64).collect();
        let series = series_with_roe(&roes);
        let strategy = FactorScore::new(10, 0.9).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        // A strictly improving score is always the window maximum.
        assert_eq!(signals.values()[29], 1.0);
    }

    #[test]
    fn deteriorating_fundamentals_stay_flat() {
        let roes: Vec<f64> = (0..30).map(|i| 0.3 - 0.005 * i as f64).collect();
        let series = series_with_roe(&roes);
        let strategy = FactorScore::new(10, 0.5).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert!(signals.values()[10..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn neutral_enrichment_is_never_top_rank() {
        // Default enrichment is all zeros: every score ties, rank == 1.0.
        // That makes the gate pass, which is why providers must backfill
        // real enrichment before this strategy is meaningful.
        let series = series_from_closes("TEST", &[100.0; 20]);
        let strategy = FactorScore::new(10, 0.7).unwrap();
        let signals = strategy.generate_signals(&series).unwrap();
        assert_eq!(signals.values()[19], 1.0);
    }

    #[test]
    fn rejects_out_of_range_rank() {
        assert!(FactorScore::new(60, 0.0).is_err());
        assert!(FactorScore::new(60, 1.5).is_err());
    }
}
