//! Market data snapshots
//!
//! A captured [`MarketData`] stored as JSON, replayable without network access.

use super::{MarketData, MarketDataSource, Treasury};
use crate::error::ValuationError;
use crate::model::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

impl MarketData {
    /// Load a snapshot written by [`MarketData::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ValuationError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ValuationError::data_unavailable(path.display().to_string(), e.to_string())
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ValuationError::data_unavailable(
                path.display().to_string(),
                format!("malformed snapshot: {}", e),
            )
        })
    }

    /// Write the snapshot as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[async_trait]
impl MarketDataSource for MarketData {
    async fn price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ValuationError> {
        self.price_series
            .get(ticker)
            .map(|s| s.between(start, end))
            .ok_or_else(|| ValuationError::data_unavailable(ticker, "not in snapshot"))
    }

    async fn treasury_yield(
        &self,
        treasury: &Treasury,
        as_of: NaiveDate,
    ) -> Result<f64, ValuationError> {
        if as_of != self.as_of {
            return Err(ValuationError::data_unavailable(
                &treasury.ticker,
                format!("snapshot is as of {}, not {}", self.as_of, as_of),
            ));
        }
        self.treasury_yields
            .iter()
            .find(|q| q.treasury.ticker == treasury.ticker)
            .and_then(|q| q.yield_pct)
            .ok_or_else(|| ValuationError::data_unavailable(&treasury.ticker, "not in snapshot"))
    }
}
