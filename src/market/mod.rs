//! Market data module
//!
//! Historical comp prices and treasury yields as of the valuation date. The
//! valuation core only consumes [`MarketData`]; where it comes from is up to a
//! [`MarketDataSource`].

mod snapshot;
mod yahoo;

pub use yahoo::{YahooClient, YahooConfig, YAHOO_API_URL};

use crate::error::ValuationError;
use crate::model::{PriceSeries, YieldCurvePoint};
use crate::telemetry::{record_latency, LatencyMetric};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::{join, join_all};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// A treasury index used as one point of the risk-free curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    /// Display label (e.g., "10-year")
    pub label: String,
    /// Quote symbol (e.g., "^TNX")
    pub ticker: String,
    /// Maturity in years
    pub maturity_years: f64,
}

impl Treasury {
    pub fn new(label: impl Into<String>, ticker: impl Into<String>, maturity_years: f64) -> Self {
        Self {
            label: label.into(),
            ticker: ticker.into(),
            maturity_years,
        }
    }

    /// CBOE treasury yield indices
    pub fn defaults() -> Vec<Treasury> {
        vec![
            Treasury::new("13-week", "^IRX", 0.25),
            Treasury::new("5-year", "^FVX", 5.0),
            Treasury::new("10-year", "^TNX", 10.0),
            Treasury::new("30-year", "^TYX", 30.0),
        ]
    }
}

/// Treasury yield as fetched; `yield_pct` is `None` when it was unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryQuote {
    pub treasury: Treasury,
    pub yield_pct: Option<f64>,
}

/// Market data needed for one valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Valuation date the data was gathered for
    pub as_of: NaiveDate,
    /// Adjusted-close series keyed by ticker
    pub price_series: BTreeMap<String, PriceSeries>,
    /// Treasury quotes, including the ones that could not be fetched
    pub treasury_yields: Vec<TreasuryQuote>,
}

impl MarketData {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            price_series: BTreeMap::new(),
            treasury_yields: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.price_series.insert(series.ticker().to_string(), series);
        self
    }

    pub fn with_yield(mut self, treasury: Treasury, yield_pct: Option<f64>) -> Self {
        self.treasury_yields.push(TreasuryQuote {
            treasury,
            yield_pct,
        });
        self
    }

    /// Known (maturity, yield) points; unavailable quotes are skipped
    pub fn yield_points(&self) -> Vec<YieldCurvePoint> {
        self.treasury_yields
            .iter()
            .filter_map(|q| {
                q.yield_pct
                    .map(|y| YieldCurvePoint::new(q.treasury.maturity_years, y))
            })
            .collect()
    }
}

/// Trait for market data providers
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily adjusted closes with `start <= date < end`
    async fn price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ValuationError>;

    /// Treasury yield in percent on `as_of`, or the latest quote before it
    async fn treasury_yield(
        &self,
        treasury: &Treasury,
        as_of: NaiveDate,
    ) -> Result<f64, ValuationError>;
}

/// Fetch every comp series and treasury quote concurrently
///
/// Individual failures are logged and left out (comps) or recorded as
/// unavailable (treasuries); deciding whether enough data remains is the
/// valuation's job.
pub async fn fetch_market_data<S: MarketDataSource + ?Sized>(
    source: &S,
    comps: &[String],
    start: NaiveDate,
    as_of: NaiveDate,
    treasuries: &[Treasury],
) -> MarketData {
    let series_futures = comps.iter().map(|ticker| async move {
        let started = Instant::now();
        let result = source.price_series(ticker, start, as_of).await;
        record_latency(LatencyMetric::PriceFetch, started.elapsed());
        (ticker, result)
    });

    let yield_futures = treasuries.iter().map(|treasury| async move {
        let started = Instant::now();
        let result = source.treasury_yield(treasury, as_of).await;
        record_latency(LatencyMetric::TreasuryFetch, started.elapsed());
        (treasury, result)
    });

    let (series_results, yield_results) =
        join(join_all(series_futures), join_all(yield_futures)).await;

    let mut data = MarketData::new(as_of);
    for (ticker, result) in series_results {
        match result {
            Ok(series) => {
                tracing::info!(ticker = %ticker, observations = series.len(), "Fetched price series");
                data.price_series.insert(ticker.clone(), series);
            }
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "Price series unavailable");
            }
        }
    }

    for (treasury, result) in yield_results {
        let yield_pct = match result {
            Ok(y) => {
                tracing::info!(treasury = %treasury.label, yield_pct = y, "Fetched treasury yield");
                Some(y)
            }
            Err(e) => {
                tracing::warn!(treasury = %treasury.label, error = %e, "Treasury yield unavailable");
                None
            }
        };
        data = data.with_yield(treasury.clone(), yield_pct);
    }

    data
}
