//! Performance analytics over a completed simulation.
//!
//! All ratio metrics are annualized off 252 trading days; CAGR uses the
//! calendar span of the run. Values are rounded for presentation: four
//! decimals for returns and rates, three for sharpe, sortino and calmar.

use serde::{Deserialize, Serialize};

use crate::engine::SimulationResult;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Sweep ranking score: reward return, lightly reward risk-adjusted return,
/// penalize drawdown (max_drawdown is negative).
pub fn composite_score(metrics: &MetricsRecord) -> f64 {
    metrics.total_return + 0.1 * metrics.sharpe + 0.5 * metrics.max_drawdown
}

/// Headline metrics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub total_return: f64,
    /// Calendar-compounded annual growth rate.
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub calmar: f64,
    /// Share of up days among days with non-zero net return.
    pub win_rate: f64,
    /// Round trips: total exposure change divided by two.
    pub trade_count: u64,
    /// Average absolute exposure change per bar.
    pub turnover: f64,
    pub bars: usize,
}

impl MetricsRecord {
    /// All-zero record for an empty simulation.
    pub fn empty() -> Self {
        Self {
            total_return: 0.0,
            annual_return: 0.0,
            annual_volatility: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            max_drawdown: 0.0,
            calmar: 0.0,
            win_rate: 0.0,
            trade_count: 0,
            turnover: 0.0,
            bars: 0,
        }
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}

/// Compute the full metrics record for a simulation.
pub fn compute_metrics(result: &SimulationResult) -> MetricsRecord {
    if result.is_empty() {
        return MetricsRecord::empty();
    }

    let returns = &result.net_returns;
    let n = returns.len();

    let total_return = result.total_return();

    // CAGR over the calendar span; a single-bar run has no span.
    let annual_return = match (result.dates.first(), result.dates.last()) {
        (Some(first), Some(last)) => {
            let days = (*last - *first).num_days();
            if days > 0 && total_return > -1.0 {
                (1.0 + total_return).powf(365.0 / days as f64) - 1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    let daily_std = sample_std(returns);
    let annual_volatility = daily_std * TRADING_DAYS.sqrt();
    let mean_daily = returns.iter().sum::<f64>() / n as f64;

    let sharpe = if daily_std > 0.0 {
        mean_daily / daily_std * TRADING_DAYS.sqrt()
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_std = sample_std(&downside);
    let sortino = if downside_std > 0.0 {
        mean_daily / downside_std * TRADING_DAYS.sqrt()
    } else {
        0.0
    };

    let max_drawdown = result.max_drawdown();
    let calmar = if max_drawdown < 0.0 {
        annual_return / max_drawdown.abs()
    } else {
        0.0
    };

    let active: Vec<f64> = returns.iter().copied().filter(|r| *r != 0.0).collect();
    let win_rate = if active.is_empty() {
        0.0
    } else {
        active.iter().filter(|r| **r > 0.0).count() as f64 / active.len() as f64
    };

    let gross = result.gross_turnover();
    let trade_count = (gross / 2.0) as u64;
    let turnover = gross / n as f64;

    MetricsRecord {
        total_return: round_to(total_return, 4),
        annual_return: round_to(annual_return, 4),
        annual_volatility: round_to(annual_volatility, 4),
        sharpe: round_to(sharpe, 3),
        sortino: round_to(sortino, 3),
        max_drawdown: round_to(max_drawdown, 4),
        calmar: round_to(calmar, 3),
        win_rate: round_to(win_rate, 4),
        trade_count,
        turnover: round_to(turnover, 4),
        bars: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionSeries;
    use crate::engine::{CostModel, SimulationEngine, SimulationResult};
    use crate::strategy::testkit::series_from_closes;

    fn simulate(closes: &[f64], signals: Vec<f64>) -> SimulationResult {
        let series = series_from_closes("TEST", closes);
        let engine = SimulationEngine::new(CostModel::frictionless(), 100_000.0).unwrap();
        engine
            .run(&series, &PositionSeries::try_new(signals).unwrap())
            .unwrap()
    }

    #[test]
    fn empty_simulation_yields_zero_record() {
        let result = simulate(&[], vec![]);
        assert_eq!(compute_metrics(&result), MetricsRecord::empty());
    }

    #[test]
    fn flat_run_has_zero_everything() {
        let result = simulate(&[100.0, 110.0, 105.0, 120.0], vec![0.0; 4]);
        let metrics = compute_metrics(&result);
        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.sharpe, 0.0);
        assert_eq!(metrics.annual_volatility, 0.0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.trade_count, 0);
    }

    #[test]
    fn zero_variance_returns_guard_sharpe() {
        // Constant positive daily return: std is 0 only if all equal; here
        // returns are identical so sharpe falls back to 0 rather than inf.
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let result = simulate(&closes, vec![1.0; 10]);
        let metrics = compute_metrics(&result);
        // First bar is flat so returns are NOT all identical; variance > 0.
        assert!(metrics.sharpe > 0.0);

        // Truly constant returns: all-flat run plus no price moves.
        let flat = simulate(&[100.0; 10], vec![1.0; 10]);
        let flat_metrics = compute_metrics(&flat);
        assert_eq!(flat_metrics.sharpe, 0.0);
    }

    #[test]
    fn buy_and_hold_total_return_matches_price() {
        let closes = vec![100.0, 100.0, 110.0, 121.0];
        let result = simulate(&closes, vec![1.0; 4]);
        let metrics = compute_metrics(&result);
        // Entered at bar 1 close == 100, rode to 121.
        assert_eq!(metrics.total_return, 0.21);
        assert!(metrics.annual_return > 0.0);
    }

    #[test]
    fn drawdown_and_calmar_sign_convention() {
        let closes = vec![100.0, 120.0, 90.0, 100.0];
        let result = simulate(&closes, vec![1.0; 4]);
        let metrics = compute_metrics(&result);
        assert!(metrics.max_drawdown < 0.0);
        assert!(metrics.max_drawdown >= -1.0);
    }

    #[test]
    fn win_rate_ignores_flat_days() {
        // Two active days: one up, one down.
        let closes = vec![100.0, 100.0, 110.0, 99.0, 99.0];
        let result = simulate(&closes, vec![1.0, 1.0, 1.0, 0.0, 0.0]);
        let metrics = compute_metrics(&result);
        assert_eq!(metrics.win_rate, 0.5);
    }

    #[test]
    fn trade_count_counts_round_trips() {
        let closes = vec![100.0; 8];
        let signals = vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let result = simulate(&closes, signals);
        let metrics = compute_metrics(&result);
        assert_eq!(metrics.trade_count, 2);
        assert_eq!(metrics.turnover, 0.5);
    }

    #[test]
    fn rounding_is_applied() {
        let closes = vec![100.0, 100.0, 103.333333];
        let result = simulate(&closes, vec![1.0; 3]);
        let metrics = compute_metrics(&result);
        let scaled = metrics.total_return * 10_000.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }

    #[test]
    fn composite_score_prefers_gentler_drawdown() {
        let mut a = MetricsRecord::empty();
        a.total_return = 0.2;
        a.sharpe = 1.0;
        a.max_drawdown = -0.05;
        let mut b = a.clone();
        b.max_drawdown = -0.4;
        assert!(composite_score(&a) > composite_score(&b));
    }
}
