//! Serializable sweep configuration, loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use alphalab_core::domain::{AdjustMode, Frequency};
use alphalab_core::engine::CostModel;

use crate::source::SeriesQuery;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which backend feeds the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Quote gateway over HTTP.
    Http { base_url: String },
    /// Deterministic generated data; no network required.
    Synthetic {
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic { seed: default_seed() }
    }
}

/// Everything needed to reproduce one catalog sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    #[serde(default = "default_adjust")]
    pub adjust: AdjustMode,
    /// Join fundamentals and index trend onto the bars before simulating.
    #[serde(default = "default_true")]
    pub enrich: bool,

    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: f64,

    /// Subset of catalog strategy names to run; empty means the full catalog.
    #[serde(default)]
    pub strategies: Vec<String>,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

fn default_seed() -> u64 {
    42
}
fn default_frequency() -> Frequency {
    Frequency::Daily
}
fn default_adjust() -> AdjustMode {
    AdjustMode::ForwardAdjusted
}
fn default_true() -> bool {
    true
}
fn default_initial_cash() -> f64 {
    100_000.0
}
fn default_commission_rate() -> f64 {
    0.0003
}
fn default_slippage_rate() -> f64 {
    0.001
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("data_cache")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

impl SweepConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SweepConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.start_date >= self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} must precede end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.initial_cash <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_cash must be positive, got {}",
                self.initial_cash
            )));
        }
        if self.commission_rate < 0.0 || self.slippage_rate < 0.0 {
            return Err(ConfigError::Invalid(
                "friction rates must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn query(&self) -> SeriesQuery {
        SeriesQuery {
            symbol: self.symbol.clone(),
            frequency: self.frequency,
            adjust: self.adjust,
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.commission_rate, self.slippage_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        symbol = "600000"
        start_date = "2023-01-01"
        end_date = "2024-01-01"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = SweepConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.frequency, Frequency::Daily);
        assert_eq!(config.adjust, AdjustMode::ForwardAdjusted);
        assert!(config.enrich);
        assert_eq!(config.initial_cash, 100_000.0);
        assert_eq!(config.commission_rate, 0.0003);
        assert_eq!(config.slippage_rate, 0.001);
        assert!(config.strategies.is_empty());
        assert_eq!(config.source, SourceConfig::Synthetic { seed: 42 });
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
            symbol = "000001"
            start_date = "2022-06-01"
            end_date = "2023-06-01"
            frequency = "daily"
            adjust = "unadjusted"
            enrich = false
            initial_cash = 50000.0
            commission_rate = 0.0005
            slippage_rate = 0.002
            strategies = ["ma_crossover", "rsi_reversion"]
            cache_dir = "/tmp/cache"
            results_dir = "/tmp/results"

            [source]
            kind = "http"
            base_url = "http://gateway.local"
        "#;
        let config = SweepConfig::from_toml(toml).unwrap();
        assert_eq!(config.adjust, AdjustMode::Unadjusted);
        assert!(!config.enrich);
        assert_eq!(config.strategies.len(), 2);
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "http://gateway.local".into()
            }
        );
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let toml = r#"
            symbol = "600000"
            start_date = "2024-01-01"
            end_date = "2023-01-01"
        "#;
        assert!(matches!(
            SweepConfig::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn non_positive_cash_is_rejected() {
        let toml = r#"
            symbol = "600000"
            start_date = "2023-01-01"
            end_date = "2024-01-01"
            initial_cash = 0.0
        "#;
        assert!(SweepConfig::from_toml(toml).is_err());
    }

    #[test]
    fn query_mirrors_config() {
        let config = SweepConfig::from_toml(MINIMAL).unwrap();
        let query = config.query();
        assert_eq!(query.symbol, "600000");
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
