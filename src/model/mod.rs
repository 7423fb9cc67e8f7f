//! Valuation model module
//!
//! The numeric core: years to maturity, comparable-company volatility,
//! treasury curve interpolation and Black-Scholes pricing. Everything here is
//! a pure function of its inputs.

mod black_scholes;
mod curve;
mod maturity;
mod volatility;

pub use black_scholes::{norm_cdf, BlackScholesModel, BlackScholesParams};
pub use curve::{YieldCurve, MAX_MATURITY_YEARS};
pub use maturity::{
    default_lookback_years, lookback_start, years_between, years_to_maturity, DAYS_PER_YEAR,
};
pub use volatility::{
    ExcludedComp, TickerVolatility, VolatilityEstimator, VolatilitySummary, MIN_OBSERVATIONS,
};

use crate::error::ValuationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resampling frequency for volatility estimation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Number of resampled periods in one year
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
        }
    }

    /// Factor that scales a periodic deviation to one year
    pub fn annualization_factor(&self) -> f64 {
        self.periods_per_year().sqrt()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// A single adjusted-close observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub price: f64,
}

/// Date-ordered adjusted-close prices for one ticker
///
/// Dates are strictly increasing. Missing trading days are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    ticker: String,
    observations: Vec<PriceObservation>,
}

#[derive(Deserialize)]
struct RawPriceSeries {
    ticker: String,
    observations: Vec<PriceObservation>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = ValuationError;

    fn try_from(raw: RawPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.ticker, raw.observations)
    }
}

impl PriceSeries {
    /// Build a series, rejecting dates that are not strictly increasing
    pub fn new(
        ticker: impl Into<String>,
        observations: Vec<PriceObservation>,
    ) -> Result<Self, ValuationError> {
        let ticker = ticker.into();
        if let Some(pair) = observations.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ValuationError::Validation(format!(
                "price series for {} is not strictly increasing at {}",
                ticker, pair[1].date
            )));
        }
        Ok(Self {
            ticker,
            observations,
        })
    }

    /// Build a series from (date, price) pairs
    pub fn from_pairs(
        ticker: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, ValuationError> {
        let observations = pairs
            .into_iter()
            .map(|(date, price)| PriceObservation { date, price })
            .collect();
        Self::new(ticker, observations)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations with `start <= date < end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        PriceSeries {
            ticker: self.ticker.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date < end)
                .copied()
                .collect(),
        }
    }
}

/// Treasury yield at one maturity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    /// Maturity in years
    pub maturity: f64,
    /// Yield in percent
    pub yield_pct: f64,
}

impl YieldCurvePoint {
    pub fn new(maturity: f64, yield_pct: f64) -> Self {
        Self {
            maturity,
            yield_pct,
        }
    }
}
