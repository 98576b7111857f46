//! AlphaLab CLI — fetch, sweep, and results commands.
//!
//! Commands:
//! - `fetch` — pull one symbol's bars through the provider and cache them
//! - `sweep` — run the strategy catalog over a symbol and rank the results
//! - `results` — list persisted runs, newest first

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use alphalab_core::domain::AdjustMode;
use alphalab_core::engine::SimulationEngine;
use alphalab_core::strategy::StrategyRegistry;
use alphalab_runner::{
    run_catalog, summary_text, write_equity_curve, HttpSource, MarketDataProvider,
    MarketDataSource, QueryCache, RunStore, SeriesQuery, SourceConfig, SweepConfig,
    SyntheticSource,
};

#[derive(Parser)]
#[command(name = "alphalab", about = "AlphaLab CLI — strategy backtesting lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one symbol's daily bars and warm the Parquet cache.
    Fetch {
        /// Symbol to fetch (e.g. 600000).
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to 2 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Price adjustment: forward_adjusted, backward_adjusted, unadjusted.
        #[arg(long, default_value = "forward_adjusted")]
        adjust: String,

        /// Quote gateway base URL. Without it, synthetic data is used.
        #[arg(long)]
        base_url: Option<String>,

        /// Seed for the synthetic source.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Cache directory.
        #[arg(long, default_value = "data_cache")]
        cache_dir: PathBuf,
    },
    /// Run the strategy catalog over one symbol and rank the outcomes.
    Sweep {
        /// Path to a TOML sweep config. Flags below are ignored when set.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol to sweep (required without --config).
        #[arg(long)]
        symbol: Option<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Quote gateway base URL. Without it, synthetic data is used.
        #[arg(long)]
        base_url: Option<String>,

        /// Seed for the synthetic source.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Skip fundamental/index enrichment.
        #[arg(long, default_value_t = false)]
        no_enrich: bool,

        /// Do not persist run records.
        #[arg(long, default_value_t = false)]
        no_persist: bool,

        /// Export the best strategy's equity curve as CSV into this directory.
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Cache directory.
        #[arg(long, default_value = "data_cache")]
        cache_dir: PathBuf,

        /// Results directory for persisted runs.
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
    },
    /// List persisted runs, newest first.
    Results {
        /// Only show runs for this strategy.
        #[arg(long)]
        strategy: Option<String>,

        /// Results directory.
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Maximum number of runs to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Emit records as pretty-printed JSON instead of one line each.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbol,
            start,
            end,
            adjust,
            base_url,
            seed,
            cache_dir,
        } => run_fetch(symbol, start, end, &adjust, base_url, seed, cache_dir),
        Commands::Sweep {
            config,
            symbol,
            start,
            end,
            base_url,
            seed,
            no_enrich,
            no_persist,
            export_dir,
            cache_dir,
            results_dir,
        } => {
            let sweep_config = match config {
                Some(path) => SweepConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => {
                    let Some(symbol) = symbol else {
                        bail!("one of --config or --symbol is required");
                    };
                    build_flag_config(
                        symbol, start, end, base_url, seed, no_enrich, cache_dir, results_dir,
                    )?
                }
            };
            run_sweep(&sweep_config, no_persist, export_dir)
        }
        Commands::Results {
            strategy,
            results_dir,
            limit,
            json,
        } => run_results(strategy.as_deref(), &results_dir, limit, json),
    }
}

// ─── fetch ───────────────────────────────────────────────────────────

fn run_fetch(
    symbol: String,
    start: Option<String>,
    end: Option<String>,
    adjust: &str,
    base_url: Option<String>,
    seed: u64,
    cache_dir: PathBuf,
) -> Result<()> {
    let query = SeriesQuery::daily(
        symbol,
        parse_adjust(adjust)?,
        parse_date_or(start.as_deref(), default_start())?,
        parse_date_or(end.as_deref(), today())?,
    );

    let provider = MarketDataProvider::new(
        build_source(base_url, seed)?,
        Some(QueryCache::new(cache_dir)),
    );
    let series = provider.get_series(&query, false)?;

    println!(
        "Fetched {} bars for {} ({} to {}) via {}",
        series.len(),
        series.symbol(),
        query.start,
        query.end,
        provider.source_name()
    );
    println!("Dataset hash: {}", series.dataset_hash());
    Ok(())
}

// ─── sweep ───────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn build_flag_config(
    symbol: String,
    start: Option<String>,
    end: Option<String>,
    base_url: Option<String>,
    seed: u64,
    no_enrich: bool,
    cache_dir: PathBuf,
    results_dir: PathBuf,
) -> Result<SweepConfig> {
    let config = SweepConfig {
        symbol,
        start_date: parse_date_or(start.as_deref(), default_start())?,
        end_date: parse_date_or(end.as_deref(), today())?,
        frequency: alphalab_core::domain::Frequency::Daily,
        adjust: AdjustMode::ForwardAdjusted,
        enrich: !no_enrich,
        initial_cash: 100_000.0,
        commission_rate: 0.0003,
        slippage_rate: 0.001,
        strategies: Vec::new(),
        source: match base_url {
            Some(base_url) => SourceConfig::Http { base_url },
            None => SourceConfig::Synthetic { seed },
        },
        cache_dir,
        results_dir,
    };
    config.validate()?;
    Ok(config)
}

fn run_sweep(
    config: &SweepConfig,
    no_persist: bool,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let source = match &config.source {
        SourceConfig::Http { base_url } => build_source(Some(base_url.clone()), 0)?,
        SourceConfig::Synthetic { seed } => build_source(None, *seed)?,
    };
    let provider =
        MarketDataProvider::new(source, Some(QueryCache::new(config.cache_dir.clone())));

    let query = config.query();
    let series = provider.get_series(&query, config.enrich)?;

    let full_registry = StrategyRegistry::with_builtins();
    let registry = if config.strategies.is_empty() {
        full_registry
    } else {
        full_registry.subset(&config.strategies)?
    };

    let engine = SimulationEngine::new(config.cost_model(), config.initial_cash)?;
    let store = RunStore::new(config.results_dir.clone());
    let store_ref = if no_persist { None } else { Some(&store) };

    let report = run_catalog(&registry, &series, &engine, store_ref)?;
    print!("{}", summary_text(&report));

    if let Some(export_dir) = export_dir {
        if let Some(best) = report.best() {
            let strategy = registry.build(&best.name, &best.parameters)?;
            let result = engine.run_strategy(strategy.as_ref(), &series)?;
            let path = export_dir.join(format!("{}_{}.csv", series.symbol(), best.name));
            write_equity_curve(&result, &path)?;
            println!("\nEquity curve exported to: {}", path.display());
        }
    }

    Ok(())
}

// ─── results ─────────────────────────────────────────────────────────

fn run_results(
    strategy: Option<&str>,
    results_dir: &PathBuf,
    limit: usize,
    json: bool,
) -> Result<()> {
    let store = RunStore::new(results_dir);
    let records = store.list_results(strategy)?;

    if records.is_empty() {
        println!("No persisted runs in {}", results_dir.display());
        return Ok(());
    }

    if json {
        let shown: Vec<_> = records.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    for record in records.iter().take(limit) {
        println!(
            "{}  {}  {}  {}  ret {:+.2}%  sharpe {:.3}  dd {:.2}%",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.run_id,
            record.strategy,
            record.data.symbol,
            record.metrics.total_return * 100.0,
            record.metrics.sharpe,
            record.metrics.max_drawdown * 100.0,
        );
    }
    Ok(())
}

// ─── helpers ─────────────────────────────────────────────────────────

fn build_source(base_url: Option<String>, seed: u64) -> Result<Box<dyn MarketDataSource>> {
    Ok(match base_url {
        Some(url) => Box::new(HttpSource::new(url)?),
        None => Box::new(SyntheticSource::new(seed)),
    })
}

fn parse_adjust(value: &str) -> Result<AdjustMode> {
    Ok(match value {
        "forward_adjusted" => AdjustMode::ForwardAdjusted,
        "backward_adjusted" => AdjustMode::BackwardAdjusted,
        "unadjusted" => AdjustMode::Unadjusted,
        other => bail!(
            "unknown adjust mode '{other}'. Valid: forward_adjusted, backward_adjusted, unadjusted"
        ),
    })
}

fn parse_date_or(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    Ok(value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")?
        .unwrap_or(default))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn default_start() -> NaiveDate {
    today() - chrono::Duration::days(365 * 2)
}
