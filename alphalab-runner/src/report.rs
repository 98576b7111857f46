//! Plain-text sweep report rendering.

use crate::orchestrator::SweepReport;

/// Render a sweep report as markdown for terminal or file output.
pub fn summary_text(report: &SweepReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Sweep report: {} ({} bars, {} to {})\n\n",
        report.data.symbol, report.data.bar_count, report.data.start_date, report.data.end_date
    ));
    out.push_str(&format!("Dataset hash: `{}`\n\n", report.data.dataset_hash));

    if report.ranked.is_empty() {
        out.push_str("No strategy completed.\n");
    } else {
        out.push_str(
            "| Rank | Strategy | Total Ret | Ann Ret | Sharpe | Max DD | Win Rate | Trades | Score |\n",
        );
        out.push_str(
            "|------|----------|-----------|---------|--------|--------|----------|--------|-------|\n",
        );
        for (rank, outcome) in report.ranked.iter().enumerate() {
            let m = &outcome.metrics;
            out.push_str(&format!(
                "| {} | {} | {:.2}% | {:.2}% | {:.3} | {:.2}% | {:.2}% | {} | {:.4} |\n",
                rank + 1,
                outcome.name,
                m.total_return * 100.0,
                m.annual_return * 100.0,
                m.sharpe,
                m.max_drawdown * 100.0,
                m.win_rate * 100.0,
                m.trade_count,
                outcome.score,
            ));
        }
    }

    if !report.skipped.is_empty() {
        out.push_str("\n## Skipped\n\n");
        for skip in &report.skipped {
            out.push_str(&format!("- `{}`: {}\n", skip.name, skip.reason));
        }
    }

    out
}
