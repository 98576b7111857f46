//! HTTP JSON market data source.
//!
//! Talks to a quote gateway exposing three JSON endpoints (`/bars`,
//! `/fundamentals`, `/index/bars`). Transient failures retry with
//! exponential backoff up to a fixed bound; after the last attempt the final
//! error surfaces to the caller.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::source::{DataError, FundamentalSnapshot, MarketDataSource, RawBar, SeriesQuery};

// ─── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BarsResponse {
    rows: Vec<WireBar>,
}

#[derive(Debug, Deserialize)]
struct WireBar {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FundamentalsResponse {
    rows: Vec<WireFundamental>,
}

#[derive(Debug, Deserialize)]
struct WireFundamental {
    effective_date: NaiveDate,
    eps: Option<f64>,
    book_value_per_share: Option<f64>,
    roe: Option<f64>,
    revenue_growth: Option<f64>,
    debt_to_assets: Option<f64>,
    dividend_per_share: Option<f64>,
    shares_outstanding: Option<f64>,
}

// ─── Source ──────────────────────────────────────────────────────────

pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    fn bars_url(&self, query: &SeriesQuery) -> String {
        format!(
            "{}/bars?symbol={}&frequency={}&adjust={}&start={}&end={}",
            self.base_url,
            query.symbol,
            query.frequency.as_str(),
            query.adjust.as_str(),
            query.start,
            query.end
        )
    }

    fn fundamentals_url(&self, symbol: &str) -> String {
        format!("{}/fundamentals?symbol={symbol}", self.base_url)
    }

    fn index_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!("{}/index/bars?start={start}&end={end}", self.base_url)
    }

    /// GET with bounded exponential-backoff retries. Retries transport
    /// failures, 429 and 5xx; other HTTP errors fail immediately.
    fn get_with_retry<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, DataError> {
        let mut last_error: Option<DataError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(DataError::Network(format!("HTTP {status}")));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(DataError::Network(format!("HTTP {status} for {url}")));
                    }

                    return resp
                        .json::<T>()
                        .map_err(|e| DataError::Format(e.to_string()));
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::Network(e.to_string()));
                        continue;
                    }
                    return Err(DataError::Network(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Network("max retries exceeded".into())))
    }
}

impl MarketDataSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_bars(&self, query: &SeriesQuery) -> Result<Vec<RawBar>, DataError> {
        let resp: BarsResponse = self.get_with_retry(&self.bars_url(query))?;
        let bars: Vec<RawBar> = resp
            .rows
            .into_iter()
            .map(|row| RawBar {
                date: row.date,
                open: row.open.unwrap_or(f64::NAN),
                high: row.high.unwrap_or(f64::NAN),
                low: row.low.unwrap_or(f64::NAN),
                close: row.close.unwrap_or(f64::NAN),
                volume: row.volume.unwrap_or(0),
            })
            .collect();

        if bars.is_empty() {
            return Err(DataError::Unavailable {
                symbol: query.symbol.clone(),
            });
        }
        Ok(bars)
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<Vec<FundamentalSnapshot>, DataError> {
        let resp: FundamentalsResponse = self.get_with_retry(&self.fundamentals_url(symbol))?;
        Ok(resp
            .rows
            .into_iter()
            .map(|row| FundamentalSnapshot {
                effective_date: row.effective_date,
                eps: row.eps.unwrap_or(0.0),
                book_value_per_share: row.book_value_per_share.unwrap_or(0.0),
                roe: row.roe.unwrap_or(0.0),
                revenue_growth: row.revenue_growth.unwrap_or(0.0),
                debt_to_assets: row.debt_to_assets.unwrap_or(0.0),
                dividend_per_share: row.dividend_per_share.unwrap_or(0.0),
                shares_outstanding: row.shares_outstanding.unwrap_or(0.0),
            })
            .collect())
    }

    fn fetch_index_bars(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let resp: BarsResponse = self.get_with_retry(&self.index_url(start, end))?;
        Ok(resp
            .rows
            .into_iter()
            .filter(|row| row.close.is_some())
            .map(|row| RawBar {
                date: row.date,
                open: row.open.unwrap_or(f64::NAN),
                high: row.high.unwrap_or(f64::NAN),
                low: row.low.unwrap_or(f64::NAN),
                close: row.close.unwrap_or(f64::NAN),
                volume: row.volume.unwrap_or(0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphalab_core::domain::AdjustMode;

    #[test]
    fn urls_encode_the_query() {
        let source = HttpSource::new("http://gateway.local").unwrap();
        let query = SeriesQuery::daily(
            "600000",
            AdjustMode::ForwardAdjusted,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let url = source.bars_url(&query);
        assert!(url.contains("symbol=600000"));
        assert!(url.contains("frequency=daily"));
        assert!(url.contains("adjust=forward_adjusted"));
        assert!(url.contains("start=2023-01-01"));
    }

    #[test]
    fn wire_bars_parse_with_nulls() {
        let json = r#"{"rows":[
            {"date":"2024-01-02","open":10.0,"high":11.0,"low":9.5,"close":10.5,"volume":1000},
            {"date":"2024-01-03","open":null,"high":null,"low":null,"close":10.7,"volume":null}
        ]}"#;
        let resp: BarsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.rows.len(), 2);
        assert!(resp.rows[1].open.is_none());
        assert_eq!(resp.rows[1].close, Some(10.7));
    }

    #[test]
    fn wire_fundamentals_parse() {
        let json = r#"{"rows":[
            {"effective_date":"2023-10-31","eps":1.2,"book_value_per_share":8.5,
             "roe":0.14,"revenue_growth":0.06,"debt_to_assets":0.45,
             "dividend_per_share":0.3,"shares_outstanding":1000000.0}
        ]}"#;
        let resp: FundamentalsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(resp.rows[0].eps, Some(1.2));
    }
}
