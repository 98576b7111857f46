//! AlphaLab Core — domain types, indicators, strategy catalog, simulation
//! engine and performance analytics.
//!
//! This crate is pure compute: no I/O, no clocks, no network. Everything here
//! is deterministic for the same inputs:
//! - Domain types (bars, series, position series)
//! - Rolling indicators with NaN warmup
//! - The `Strategy` trait, twelve built-in strategies and the registry
//! - Vectorized one-bar-delay simulation engine with proportional costs
//! - Metrics (CAGR, sharpe, sortino, calmar, drawdown, win rate, turnover)

pub mod analytics;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
