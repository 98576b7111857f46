//! Market data provider: source + cache + normalization + enrichment.
//!
//! `get_series` is the single entry point the rest of the system uses for
//! market data. A cache hit returns the cached bars unchanged; a miss fetches
//! from the source, normalizes (sort, dedupe, reject incomplete price rows),
//! writes the cache and enriches.
//!
//! Enrichment joins quarterly fundamentals onto daily bars with as-of
//! backward matching on `effective_date <= bar date` — never the most recent
//! disclosure overall, which would leak future information. Derived ratios
//! are computed from the join result so the as-of alignment stays exact.

use std::collections::HashMap;

use chrono::NaiveDate;

use alphalab_core::domain::{Bar, Series};
use alphalab_core::indicators::{rolling_volatility, sma};

use crate::cache::QueryCache;
use crate::source::{DataError, FundamentalSnapshot, MarketDataSource, RawBar, SeriesQuery};

/// Window for the rolling volatility column and the index trend line.
const ENRICHMENT_WINDOW: usize = 20;

pub struct MarketDataProvider {
    source: Box<dyn MarketDataSource>,
    cache: Option<QueryCache>,
}

impl MarketDataProvider {
    pub fn new(source: Box<dyn MarketDataSource>, cache: Option<QueryCache>) -> Self {
        Self { source, cache }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch, normalize and (optionally) enrich one series.
    pub fn get_series(&self, query: &SeriesQuery, enrich: bool) -> Result<Series, DataError> {
        let raw = match self.cache.as_ref().and_then(|c| c.load(query)) {
            Some(cached) => cached,
            None => {
                let fetched = self.source.fetch_bars(query)?;
                let normalized = normalize(fetched, &query.symbol)?;
                if let Some(cache) = &self.cache {
                    // Cache failures degrade to uncached operation.
                    if let Err(e) = cache.store(query, &normalized) {
                        eprintln!("WARNING: cache store failed for {}: {e}", query.symbol);
                    }
                }
                normalized
            }
        };

        let mut bars: Vec<Bar> = raw
            .iter()
            .map(|r| Bar::ohlcv(r.date, r.open, r.high, r.low, r.close, r.volume))
            .collect();

        apply_volatility(&mut bars);

        if enrich {
            let fundamentals = self.source.fetch_fundamentals(&query.symbol)?;
            apply_fundamentals(&mut bars, fundamentals);

            // Index trend is best-effort: on failure the column keeps its
            // neutral default instead of failing the whole call.
            match self.source.fetch_index_bars(query.start, query.end) {
                Ok(index_bars) => apply_index_trend(&mut bars, &index_bars),
                Err(e) => {
                    eprintln!("WARNING: index trend enrichment unavailable: {e}");
                }
            }
        }

        Series::try_new(query.symbol.clone(), query.frequency, query.adjust, bars)
            .map_err(|e| DataError::Validation(e.to_string()))
    }
}

// ─── Normalization ───────────────────────────────────────────────────

/// Sort ascending, drop duplicate dates (last wins), reject rows missing any
/// price column. Empty output is `Unavailable`.
pub fn normalize(mut raw: Vec<RawBar>, symbol: &str) -> Result<Vec<RawBar>, DataError> {
    raw.sort_by_key(|b| b.date);

    let mut normalized: Vec<RawBar> = Vec::with_capacity(raw.len());
    for bar in raw {
        if !bar.has_complete_prices() {
            continue;
        }
        match normalized.last() {
            Some(last) if last.date == bar.date => {
                let idx = normalized.len() - 1;
                normalized[idx] = bar;
            }
            _ => normalized.push(bar),
        }
    }

    if normalized.is_empty() {
        return Err(DataError::Unavailable {
            symbol: symbol.to_string(),
        });
    }
    Ok(normalized)
}

// ─── Enrichment ──────────────────────────────────────────────────────

/// Rolling close-to-close volatility; warmup bars keep the neutral default.
fn apply_volatility(bars: &mut [Bar]) {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let vol = rolling_volatility(&closes, ENRICHMENT_WINDOW);
    for (bar, &v) in bars.iter_mut().zip(&vol) {
        if !v.is_nan() {
            bar.volatility = v;
        }
    }
}

/// As-of backward join of quarterly snapshots, plus derived ratios.
fn apply_fundamentals(bars: &mut [Bar], mut snapshots: Vec<FundamentalSnapshot>) {
    if snapshots.is_empty() {
        return;
    }
    snapshots.sort_by_key(|s| s.effective_date);

    // Market cap uses the latest share count at historical closes. A known
    // approximation: share counts are not reconstructed per bar.
    let latest_shares = snapshots
        .last()
        .map(|s| s.shares_outstanding)
        .unwrap_or(0.0);

    let mut idx: Option<usize> = None;
    let mut next = 0usize;
    for bar in bars.iter_mut() {
        while next < snapshots.len() && snapshots[next].effective_date <= bar.date {
            idx = Some(next);
            next += 1;
        }
        let Some(i) = idx else { continue };
        let snap = &snapshots[i];

        bar.pe = if snap.eps > 0.0 {
            bar.close / snap.eps
        } else {
            0.0
        };
        bar.pb = if snap.book_value_per_share > 0.0 {
            bar.close / snap.book_value_per_share
        } else {
            0.0
        };
        bar.roe = snap.roe;
        bar.revenue_growth = snap.revenue_growth;
        bar.debt_to_assets = snap.debt_to_assets;
        bar.dividend_yield = if bar.close > 0.0 {
            snap.dividend_per_share / bar.close
        } else {
            0.0
        };
        bar.total_market_value = bar.close * latest_shares;
    }
}

/// Index regime flag: +1 when the index closes above its trend SMA, -1
/// below, neutral where the index has no data for that date.
fn apply_index_trend(bars: &mut [Bar], index_bars: &[RawBar]) {
    if index_bars.is_empty() {
        return;
    }
    let mut sorted: Vec<&RawBar> = index_bars.iter().collect();
    sorted.sort_by_key(|b| b.date);

    let closes: Vec<f64> = sorted.iter().map(|b| b.close).collect();
    let trend = sma(&closes, ENRICHMENT_WINDOW);

    let mut flags: HashMap<NaiveDate, f64> = HashMap::with_capacity(sorted.len());
    for (i, bar) in sorted.iter().enumerate() {
        if trend[i].is_nan() || bar.close.is_nan() {
            continue;
        }
        flags.insert(bar.date, if bar.close > trend[i] { 1.0 } else { -1.0 });
    }

    for bar in bars.iter_mut() {
        if let Some(&flag) = flags.get(&bar.date) {
            bar.index_trend = flag;
        }
    }
}
