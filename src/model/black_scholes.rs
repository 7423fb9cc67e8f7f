//! Black-Scholes European call valuation
//!
//! d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma*sqrt(T))
//! d2 = d1 - sigma*sqrt(T)
//! C  = S*N(d1) - K*exp(-r*T)*N(d2)

use crate::error::ValuationError;
use probability::distribution::{Distribution, Gaussian};
use serde::{Deserialize, Serialize};

/// Inputs to the Black-Scholes formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackScholesParams {
    /// Spot price S
    pub spot: f64,
    /// Strike price K
    pub strike: f64,
    /// Continuously compounded risk-free rate r, as a decimal
    pub rate: f64,
    /// Annualized volatility sigma, as a fraction
    pub volatility: f64,
    /// Time to maturity T in years
    pub time_to_maturity: f64,
}

impl BlackScholesParams {
    fn validate(&self) -> Result<(), ValuationError> {
        let fields = [
            ("spot price", self.spot),
            ("strike price", self.strike),
            ("risk-free rate", self.rate),
            ("volatility", self.volatility),
            ("time to maturity", self.time_to_maturity),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValuationError::Validation(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        for (name, value) in [
            ("spot price", self.spot),
            ("strike price", self.strike),
            ("volatility", self.volatility),
            ("time to maturity", self.time_to_maturity),
        ] {
            if value <= 0.0 {
                return Err(ValuationError::Validation(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Standard normal cumulative distribution function
pub fn norm_cdf(x: f64) -> f64 {
    Gaussian::new(0.0, 1.0).distribution(x)
}

/// Black-Scholes model for European calls
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesModel;

impl BlackScholesModel {
    /// Create a new Black-Scholes model
    pub fn new() -> Self {
        Self
    }

    /// Fair value of a European call
    pub fn call_value(&self, params: &BlackScholesParams) -> Result<f64, ValuationError> {
        params.validate()?;
        let (d1, d2) = d1_d2(params);
        let discount = (-params.rate * params.time_to_maturity).exp();
        let value = params.spot * norm_cdf(d1) - params.strike * discount * norm_cdf(d2);
        // Rounding can push deep out-of-the-money values a hair below zero
        Ok(value.max(0.0))
    }
}

fn d1_d2(params: &BlackScholesParams) -> (f64, f64) {
    let sigma_sqrt_t = params.volatility * params.time_to_maturity.sqrt();
    let d1 = ((params.spot / params.strike).ln()
        + (params.rate + params.volatility.powi(2) / 2.0) * params.time_to_maturity)
        / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}
