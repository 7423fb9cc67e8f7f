//! Yahoo Finance chart API client
//!
//! Daily adjusted closes for comparable companies and closing levels of the
//! CBOE treasury yield indices (^IRX, ^FVX, ^TNX, ^TYX), which are quoted in
//! percent.

use super::{MarketDataSource, Treasury};
use crate::error::ValuationError;
use crate::model::PriceSeries;
use async_trait::async_trait;
use chrono::{DateTime, Duration as DateDuration, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance API base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) option-valuation";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the chart API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Days before the valuation date searched for a treasury quote
    pub treasury_window_days: i64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            treasury_window_days: 7,
        }
    }
}

/// Which price column to read from a chart response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceField {
    AdjustedClose,
    Close,
}

/// Client for the Yahoo Finance chart API
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: YahooConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { config, client })
    }

    /// Daily observations with `start <= date < end`
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> anyhow::Result<Vec<(NaiveDate, f64)>> {
        let url = format!("{}/v8/finance/chart/{}", self.config.base_url, ticker);
        let period1 = unix_seconds(start);
        let period2 = unix_seconds(end);

        tracing::debug!(url = %url, %start, %end, "Fetching chart from Yahoo Finance");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo Finance error for {}: {} - {}", ticker, status, body);
        }

        let chart: ChartResponse = response.json().await?;
        let observations = parse_chart(chart, field)?;
        Ok(observations
            .into_iter()
            .filter(|(date, _)| *date >= start && *date < end)
            .collect())
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ValuationError> {
        let observations = self
            .fetch_daily(ticker, start, end, PriceField::AdjustedClose)
            .await
            .map_err(|e| ValuationError::data_unavailable(ticker, format!("{:#}", e)))?;

        if observations.is_empty() {
            return Err(ValuationError::data_unavailable(
                ticker,
                format!("no prices from {} to {}", start, end),
            ));
        }

        PriceSeries::from_pairs(ticker, observations)
    }

    async fn treasury_yield(
        &self,
        treasury: &Treasury,
        as_of: NaiveDate,
    ) -> Result<f64, ValuationError> {
        let start = as_of - DateDuration::days(self.config.treasury_window_days);
        let end = as_of + DateDuration::days(1);
        let observations = self
            .fetch_daily(&treasury.ticker, start, end, PriceField::Close)
            .await
            .map_err(|e| ValuationError::data_unavailable(&treasury.ticker, format!("{:#}", e)))?;

        latest_on_or_before(&observations, as_of).ok_or_else(|| {
            ValuationError::data_unavailable(
                &treasury.ticker,
                format!("no quote between {} and {}", start, as_of),
            )
        })
    }
}

/// Quote on `as_of`, or the latest one before it
fn latest_on_or_before(observations: &[(NaiveDate, f64)], as_of: NaiveDate) -> Option<f64> {
    observations
        .iter()
        .filter(|(date, _)| *date <= as_of)
        .max_by_key(|(date, _)| *date)
        .map(|(_, value)| *value)
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Chart response envelope
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    /// Bar timestamps (seconds since epoch)
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
    #[allow(dead_code)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Turn a chart response into date-ordered observations
///
/// Null bars are skipped. Timestamps are converted to exchange-local dates;
/// when two bars share a date the one with the later timestamp wins.
fn parse_chart(chart: ChartResponse, field: PriceField) -> anyhow::Result<Vec<(NaiveDate, f64)>> {
    if let Some(err) = chart.chart.error {
        anyhow::bail!("{}: {}", err.code, err.description);
    }

    let result = chart
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow::anyhow!("empty chart result"))?;

    let values = match field {
        PriceField::AdjustedClose => result
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|a| a.adjclose),
        PriceField::Close => result.indicators.quote.into_iter().next().map(|q| q.close),
    }
    .unwrap_or_default();

    let mut bars: Vec<(i64, NaiveDate, f64)> = Vec::with_capacity(values.len());
    for (ts, value) in result.timestamp.iter().zip(values) {
        let Some(value) = value else { continue };
        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid timestamp {}", ts))?
            .date_naive();
        bars.push((*ts, date, value));
    }
    bars.sort_by_key(|(ts, _, _)| *ts);

    let mut observations: Vec<(NaiveDate, f64)> = Vec::with_capacity(bars.len());
    for (_, date, value) in bars {
        match observations.last_mut() {
            Some((last, price)) if *last == date => *price = value,
            _ => observations.push((date, value)),
        }
    }
    Ok(observations)
}
