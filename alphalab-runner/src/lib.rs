//! AlphaLab Runner — data provisioning and sweep orchestration.
//!
//! This crate builds on `alphalab-core` to provide:
//! - Market data sources (HTTP gateway, deterministic synthetic)
//! - Parquet query cache with atomic writes and corruption quarantine
//! - Provider with normalization and fundamental/index enrichment
//! - Catalog sweep over the strategy registry with ranked reporting
//! - Append-only JSON run persistence
//! - Equity-curve CSV export and TOML sweep configuration

pub mod cache;
pub mod config;
pub mod export;
pub mod http_source;
pub mod orchestrator;
pub mod persistence;
pub mod provider;
pub mod report;
pub mod source;
pub mod synthetic;

pub use cache::QueryCache;
pub use config::{ConfigError, SourceConfig, SweepConfig};
pub use export::{write_equity_curve, ExportError};
pub use http_source::HttpSource;
pub use orchestrator::{
    run_catalog, SkippedStrategy, StrategyOutcome, SweepError, SweepReport, MIN_SWEEP_BARS,
};
pub use persistence::{run_id, DataDescriptor, PersistenceError, RunRecord, RunStore};
pub use provider::MarketDataProvider;
pub use report::summary_text;
pub use source::{DataError, FundamentalSnapshot, MarketDataSource, RawBar, SeriesQuery};
pub use synthetic::SyntheticSource;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn query_and_records_are_send_sync() {
        assert_send::<SeriesQuery>();
        assert_sync::<SeriesQuery>();
        assert_send::<RawBar>();
        assert_sync::<RawBar>();
        assert_send::<RunRecord>();
        assert_sync::<RunRecord>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<SyntheticSource>();
        assert_sync::<SyntheticSource>();
        assert_send::<HttpSource>();
        assert_sync::<HttpSource>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<SweepReport>();
        assert_sync::<SweepReport>();
        assert_send::<StrategyOutcome>();
        assert_sync::<StrategyOutcome>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<SweepConfig>();
        assert_sync::<SweepConfig>();
    }
}
