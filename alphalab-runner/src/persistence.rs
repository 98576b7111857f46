//! Run persistence — one JSON file per backtest run, append-only.
//!
//! `run_id` is content-derived (strategy + parameters + data descriptor) so
//! repeated identical backtests trace to the same logical run family; the
//! wall-clock timestamp in the filename keeps each write distinct. Files are
//! written atomically and never overwritten or deleted by later saves.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use alphalab_core::analytics::MetricsRecord;
use alphalab_core::domain::{AdjustMode, Frequency};

// ─── Error type ──────────────────────────────────────────────────────

/// Distinct from simulation errors so the orchestrator can treat saves as
/// best-effort.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ─── Records ─────────────────────────────────────────────────────────

/// Identifies the exact dataset a run was computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDescriptor {
    pub symbol: String,
    pub frequency: Frequency,
    pub adjust: AdjustMode,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub bar_count: usize,
    pub dataset_hash: String,
}

/// One persisted backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub timestamp: NaiveDateTime,
    pub strategy: String,
    pub parameters: BTreeMap<String, f64>,
    pub data: DataDescriptor,
    pub metrics: MetricsRecord,
}

/// First 8 hex chars of the content hash over (strategy, params, data).
pub fn run_id(
    strategy: &str,
    parameters: &BTreeMap<String, f64>,
    data: &DataDescriptor,
) -> Result<String, PersistenceError> {
    let params_json = serde_json::to_string(parameters)?;
    let data_json = serde_json::to_string(data)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(strategy.as_bytes());
    hasher.update(params_json.as_bytes());
    hasher.update(data_json.as_bytes());
    Ok(hasher.finalize().to_hex()[..8].to_string())
}

// ─── Store ───────────────────────────────────────────────────────────

pub struct RunStore {
    results_dir: PathBuf,
}

impl RunStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Persist one run. Returns the full record including its id.
    pub fn save_result(
        &self,
        strategy: &str,
        parameters: &BTreeMap<String, f64>,
        metrics: &MetricsRecord,
        data: &DataDescriptor,
    ) -> Result<RunRecord, PersistenceError> {
        self.save_at(
            strategy,
            parameters,
            metrics,
            data,
            chrono::Local::now().naive_local(),
        )
    }

    /// Timestamp-injected variant so tests control ordering.
    pub fn save_at(
        &self,
        strategy: &str,
        parameters: &BTreeMap<String, f64>,
        metrics: &MetricsRecord,
        data: &DataDescriptor,
        timestamp: NaiveDateTime,
    ) -> Result<RunRecord, PersistenceError> {
        let record = RunRecord {
            run_id: run_id(strategy, parameters, data)?,
            timestamp,
            strategy: strategy.to_string(),
            parameters: parameters.clone(),
            data: data.clone(),
            metrics: metrics.clone(),
        };

        fs::create_dir_all(&self.results_dir)?;

        let filename = format!(
            "{}_{}_{}.json",
            record.strategy,
            record.timestamp.format("%Y%m%dT%H%M%S%3f"),
            record.run_id
        );
        let path = self.results_dir.join(filename);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PersistenceError::Io(e)
        })?;

        Ok(record)
    }

    /// All persisted runs, most recent first. `strategy` narrows to one
    /// strategy name. Malformed files are skipped, not fatal.
    pub fn list_results(&self, strategy: Option<&str>) -> Result<Vec<RunRecord>, PersistenceError> {
        if !self.results_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.results_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(record) = serde_json::from_str::<RunRecord>(&content) else {
                continue;
            };
            if let Some(name) = strategy {
                if record.strategy != name {
                    continue;
                }
            }
            records.push(record);
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}
