//! CSV export of per-bar simulation output.

use std::fs;
use std::path::Path;

use thiserror::Error;

use alphalab_core::engine::SimulationResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write the equity curve as CSV: one row per bar with the raw signal, the
/// lagged position actually held, and the resulting return/equity/drawdown.
pub fn write_equity_curve(result: &SimulationResult, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "signal", "position", "net_return", "equity", "drawdown"])?;

    for i in 0..result.len() {
        writer.write_record([
            result.dates[i].to_string(),
            format!("{}", result.signals[i]),
            format!("{}", result.positions[i]),
            format!("{:.8}", result.net_returns[i]),
            format!("{:.4}", result.equity[i]),
            format!("{:.8}", result.drawdown[i]),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
