//! Error types for the valuation pipeline

use std::fmt;
use thiserror::Error;

/// Failure raised by one of the valuation components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// Missing or malformed configuration field
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A ticker or yield maturity has no data
    #[error("data unavailable for {subject}: {reason}")]
    DataUnavailable { subject: String, reason: String },

    /// Too few observations to build a return series
    #[error("insufficient data for {ticker}: {observations} observations, need at least {required}")]
    InsufficientData {
        ticker: String,
        observations: usize,
        required: usize,
    },

    /// Inputs outside the domain of a formula
    #[error("validation error: {0}")]
    Validation(String),
}

impl ValuationError {
    pub fn data_unavailable(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

/// Pipeline stage of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Maturity,
    MarketData,
    Volatility,
    RiskFreeRate,
    Pricing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Maturity => "maturity",
            Stage::MarketData => "market data",
            Stage::Volatility => "volatility",
            Stage::RiskFreeRate => "risk-free rate",
            Stage::Pricing => "pricing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator failure tagged with the stage that produced it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: ValuationError,
}

impl StageError {
    pub fn new(stage: Stage, source: ValuationError) -> Self {
        Self { stage, source }
    }
}

/// Tag a component result with its stage
pub(crate) trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T, ValuationError> {
    fn at(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}
