//! Parquet query cache.
//!
//! One file per query key: `{cache_dir}/{symbol}_{key16}.parquet`.
//! Writes are atomic (write to .tmp, rename into place). A corrupt file is
//! quarantined with a `.quarantined` suffix and treated as a miss. There is
//! no wall-clock expiry here; freshness policy belongs to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;

use crate::source::{DataError, RawBar, SeriesQuery};

pub struct QueryCache {
    cache_dir: PathBuf,
}

impl QueryCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, query: &SeriesQuery) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}.parquet", query.symbol, query.cache_key()))
    }

    /// Store normalized bars for a query. Atomic: tmp + rename.
    pub fn store(&self, query: &SeriesQuery, bars: &[RawBar]) -> Result<(), DataError> {
        if bars.is_empty() {
            return Err(DataError::Cache("refusing to cache zero bars".into()));
        }
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::Cache(format!("create cache dir: {e}")))?;

        let df = bars_to_dataframe(bars)?;
        let path = self.entry_path(query);
        let tmp_path = path.with_extension("parquet.tmp");

        write_parquet(&df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Cache(format!("atomic rename failed: {e}"))
        })?;
        Ok(())
    }

    /// Load cached bars for a query. `None` on a miss; a corrupt file is
    /// quarantined and also reported as a miss.
    pub fn load(&self, query: &SeriesQuery) -> Option<Vec<RawBar>> {
        let path = self.entry_path(query);
        if !path.exists() {
            return None;
        }

        match load_and_validate_parquet(&path) {
            Ok(bars) => Some(bars),
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                eprintln!(
                    "WARNING: quarantining corrupt cache file {}: {e}",
                    path.display()
                );
                let _ = fs::rename(&path, &quarantine);
                None
            }
        }
    }

    pub fn contains(&self, query: &SeriesQuery) -> bool {
        self.entry_path(query).exists()
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn bars_to_dataframe(bars: &[RawBar]) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Parquet(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::Parquet(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df.clone())
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::Parquet(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::Validation("empty parquet file".into()));
    }
    for col_name in ["date", "open", "high", "low", "close", "volume"] {
        if df.column(col_name).is_err() {
            return Err(DataError::Validation(format!(
                "missing column '{col_name}'"
            )));
        }
    }

    dataframe_to_bars(&df)
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<RawBar>, DataError> {
    let col = |name: &str| {
        df.column(name)
            .map_err(|e| DataError::Parquet(format!("column read: {e}")))
    };

    let date_ca = col("date")?
        .date()
        .map_err(|e| DataError::Parquet(format!("date column type: {e}")))?
        .clone();
    let open_ca = col("open")?
        .f64()
        .map_err(|e| DataError::Parquet(format!("open column type: {e}")))?
        .clone();
    let high_ca = col("high")?
        .f64()
        .map_err(|e| DataError::Parquet(format!("high column type: {e}")))?
        .clone();
    let low_ca = col("low")?
        .f64()
        .map_err(|e| DataError::Parquet(format!("low column type: {e}")))?
        .clone();
    let close_ca = col("close")?
        .f64()
        .map_err(|e| DataError::Parquet(format!("close column type: {e}")))?
        .clone();
    let vol_ca = col("volume")?
        .u64()
        .map_err(|e| DataError::Parquet(format!("volume column type: {e}")))?
        .clone();

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let mut bars = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let date_days = date_ca
            .get(i)
            .ok_or_else(|| DataError::Parquet(format!("null date at row {i}")))?;
        bars.push(RawBar {
            date: epoch + chrono::Duration::days(date_days as i64),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.get(i).unwrap_or(0),
        });
    }
    Ok(bars)
}
