//! Volatility estimation module
//!
//! Annualized historical volatility from comparable-company price series

use super::{Frequency, PriceSeries};
use crate::error::ValuationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resampled prices needed for a sample deviation of two or more returns
pub const MIN_OBSERVATIONS: usize = 3;

/// Annualized volatility of one comparable ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerVolatility {
    pub ticker: String,
    /// Annualized volatility as a fraction
    pub volatility: f64,
    /// Resampled observations the estimate is based on
    pub observations: usize,
}

/// A comparable left out of the average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedComp {
    pub ticker: String,
    pub reason: String,
}

/// Per-comp volatilities and their average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySummary {
    pub per_ticker: Vec<TickerVolatility>,
    pub excluded: Vec<ExcludedComp>,
    pub average: f64,
}

/// Historical volatility estimator from log returns
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    frequency: Frequency,
}

impl VolatilityEstimator {
    /// Create a new volatility estimator for the given resampling frequency
    pub fn new(frequency: Frequency) -> Self {
        Self { frequency }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Last observed price in each period
    pub fn resample(&self, series: &PriceSeries) -> Vec<f64> {
        let mut resampled: Vec<(i64, f64)> = Vec::with_capacity(series.len());
        for obs in series.observations() {
            let key = period_key(self.frequency, obs.date);
            match resampled.last_mut() {
                Some((last_key, price)) if *last_key == key => *price = obs.price,
                _ => resampled.push((key, obs.price)),
            }
        }
        resampled.into_iter().map(|(_, price)| price).collect()
    }

    /// Annualized volatility of one series
    pub fn estimate(&self, series: &PriceSeries) -> Result<TickerVolatility, ValuationError> {
        let prices = self.resample(series);
        if prices.len() < MIN_OBSERVATIONS {
            return Err(ValuationError::InsufficientData {
                ticker: series.ticker().to_string(),
                observations: prices.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(ValuationError::Validation(format!(
                "non-positive price {} in series for {}",
                bad,
                series.ticker()
            )));
        }

        let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let volatility = sample_std_dev(&returns) * self.frequency.annualization_factor();

        Ok(TickerVolatility {
            ticker: series.ticker().to_string(),
            volatility,
            observations: prices.len(),
        })
    }

    /// Estimate every comp and average the ones that succeed
    ///
    /// A comp that is missing from `series` or cannot be estimated is excluded
    /// with a warning. Fails only when no comp remains.
    pub fn estimate_comps(
        &self,
        tickers: &[String],
        series: &BTreeMap<String, PriceSeries>,
    ) -> Result<VolatilitySummary, ValuationError> {
        let mut per_ticker = Vec::with_capacity(tickers.len());
        let mut excluded = Vec::new();

        for ticker in tickers {
            let result = series
                .get(ticker)
                .ok_or_else(|| ValuationError::data_unavailable(ticker, "no price series"))
                .and_then(|s| self.estimate(s));

            match result {
                Ok(vol) => {
                    tracing::debug!(
                        ticker = %ticker,
                        volatility = vol.volatility,
                        observations = vol.observations,
                        "Estimated comp volatility"
                    );
                    per_ticker.push(vol);
                }
                Err(e) => {
                    tracing::warn!(ticker = %ticker, error = %e, "Excluding comp from volatility average");
                    excluded.push(ExcludedComp {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if per_ticker.is_empty() {
            return Err(ValuationError::data_unavailable(
                "comparable companies",
                format!("none of {} comps produced a volatility", tickers.len()),
            ));
        }

        let average =
            per_ticker.iter().map(|v| v.volatility).sum::<f64>() / per_ticker.len() as f64;

        Ok(VolatilitySummary {
            per_ticker,
            excluded,
            average,
        })
    }
}

/// Identifier of the resampling period containing `date`
fn period_key(frequency: Frequency, date: NaiveDate) -> i64 {
    match frequency {
        Frequency::Daily => date.num_days_from_ce() as i64,
        Frequency::Weekly => {
            // Weeks end on Friday
            let to_friday = (4 + 7 - date.weekday().num_days_from_monday() as i64) % 7;
            date.num_days_from_ce() as i64 + to_friday
        }
        Frequency::Monthly => date.year() as i64 * 12 + date.month0() as i64,
    }
}

/// Standard deviation with an n - 1 denominator
fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
