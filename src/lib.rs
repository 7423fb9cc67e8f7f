//! option-valuation: Black-Scholes fair value for employee stock options
//!
//! This library provides:
//! - Years-to-maturity from valuation, expiration and vesting dates
//! - Historical volatility from comparable public companies
//! - Risk-free rates interpolated from treasury yields
//! - Black-Scholes call valuation
//! - A staged orchestrator tying them together
//! - Market data from Yahoo Finance or captured snapshots
//! - Parquet, text and JSON reports

pub mod cli;
pub mod config;
pub mod error;
pub mod market;
pub mod model;
pub mod report;
pub mod telemetry;
pub mod valuation;

pub use error::{Stage, StageError, ValuationError};
