//! Valuation module
//!
//! Inputs and results of one option valuation, and the orchestrator that
//! runs the model stages in order.

mod orchestrator;

pub use orchestrator::{plan, run, value, ValuationPlan};

use crate::error::ValuationError;
use crate::model::{Frequency, VolatilitySummary, YieldCurvePoint};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything needed to value one option grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationInputs {
    /// Current stock price
    pub stock_price: Decimal,
    /// Strike/exercise price
    pub strike_price: Decimal,
    pub grant_date: NaiveDate,
    pub valuation_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub vesting_end_date: NaiveDate,
    /// Comparable public company tickers
    pub public_comps: Vec<String>,
    /// Resampling frequency for volatility
    #[serde(default)]
    pub frequency: Frequency,
    /// Historical window in whole years; derived from the maturity when absent
    #[serde(default)]
    pub lookback_years: Option<u32>,
}

impl ValuationInputs {
    /// Check field types and ranges that do not depend on market data
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.stock_price <= Decimal::ZERO {
            return Err(ValuationError::Configuration(format!(
                "stock_price must be positive, got {}",
                self.stock_price
            )));
        }
        if self.strike_price <= Decimal::ZERO {
            return Err(ValuationError::Configuration(format!(
                "strike_price must be positive, got {}",
                self.strike_price
            )));
        }
        if self.public_comps.is_empty() {
            return Err(ValuationError::Configuration(
                "public_comps must list at least one ticker".to_string(),
            ));
        }
        if self.public_comps.iter().any(|t| t.trim().is_empty()) {
            return Err(ValuationError::Configuration(
                "public_comps contains a blank ticker".to_string(),
            ));
        }
        if self.lookback_years == Some(0) {
            return Err(ValuationError::Configuration(
                "lookback_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a valuation; inputs are echoed back unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub inputs: ValuationInputs,
    /// Mean of the expiration and vesting horizons
    pub years_to_maturity: f64,
    /// Historical window used for volatility
    pub lookback_years: u32,
    pub lookback_start: NaiveDate,
    /// Per-comp and average annualized volatility
    pub volatility: VolatilitySummary,
    /// Treasury yields filled at whole-year maturities
    pub yield_curve: Vec<YieldCurvePoint>,
    /// Decimal risk-free rate interpolated at the maturity
    pub risk_free_rate: f64,
    /// Black-Scholes call value, same currency as the prices
    pub fair_value: f64,
}
