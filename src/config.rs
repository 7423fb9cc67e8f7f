//! Configuration types for option-valuation
//!
//! Loaded from TOML (or JSON when the file name ends in `.json`) and validated
//! once, at load time. JSON files may also use the single-object layout, with
//! the option terms and comps at the top level.

use crate::error::ValuationError;
use crate::market::{Treasury, YahooConfig, YAHOO_API_URL};
use crate::model::{Frequency, MAX_MATURITY_YEARS};
use crate::telemetry::LogFormat;
use crate::valuation::ValuationInputs;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub option: OptionConfig,
    pub volatility: VolatilityConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Single-object JSON layout
#[derive(Debug, Deserialize)]
struct FlatConfig {
    stock_price: Decimal,
    strike_price: Decimal,
    grant_date: NaiveDate,
    valuation_date: NaiveDate,
    expiration_date: NaiveDate,
    vesting_end_date: NaiveDate,
    public_comps: Vec<String>,
    #[serde(default)]
    frequency: Frequency,
    #[serde(default)]
    lookback_years: Option<u32>,
    #[serde(default)]
    market_data: MarketDataConfig,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    telemetry: TelemetryConfig,
}

impl From<FlatConfig> for Config {
    fn from(flat: FlatConfig) -> Self {
        Self {
            option: OptionConfig {
                stock_price: flat.stock_price,
                strike_price: flat.strike_price,
                grant_date: flat.grant_date,
                valuation_date: flat.valuation_date,
                expiration_date: flat.expiration_date,
                vesting_end_date: flat.vesting_end_date,
            },
            volatility: VolatilityConfig {
                public_comps: flat.public_comps,
                frequency: flat.frequency,
                lookback_years: flat.lookback_years,
            },
            market_data: flat.market_data,
            output: flat.output,
            telemetry: flat.telemetry,
        }
    }
}

/// Option grant terms
#[derive(Debug, Clone, Deserialize)]
pub struct OptionConfig {
    pub stock_price: Decimal,
    pub strike_price: Decimal,
    pub grant_date: NaiveDate,
    pub valuation_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub vesting_end_date: NaiveDate,
}

/// Comparable-company volatility settings
#[derive(Debug, Clone, Deserialize)]
pub struct VolatilityConfig {
    pub public_comps: Vec<String>,
    #[serde(default)]
    pub frequency: Frequency,
    /// Historical window in years; defaults to the rounded years to maturity
    #[serde(default)]
    pub lookback_years: Option<u32>,
}

/// Market data client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Days before the valuation date searched for a treasury quote
    #[serde(default = "default_treasury_window_days")]
    pub treasury_window_days: u32,
    #[serde(default = "Treasury::defaults")]
    pub treasuries: Vec<Treasury>,
}

fn default_base_url() -> String {
    YAHOO_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_treasury_window_days() -> u32 {
    7
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            treasury_window_days: default_treasury_window_days(),
            treasuries: Treasury::defaults(),
        }
    }
}

impl MarketDataConfig {
    pub fn yahoo(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            treasury_window_days: self.treasury_window_days as i64,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ValuationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValuationError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ValuationError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ValuationError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON in either the sectioned or the single-object layout
    pub fn from_json(content: &str) -> Result<Self, ValuationError> {
        let to_config_error = |e: serde_json::Error| ValuationError::Configuration(e.to_string());
        let value: serde_json::Value = serde_json::from_str(content).map_err(to_config_error)?;
        let config = if value.get("option").is_some() {
            serde_json::from_value::<Config>(value).map_err(to_config_error)?
        } else {
            serde_json::from_value::<FlatConfig>(value)
                .map_err(to_config_error)?
                .into()
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks that serde cannot express
    pub fn validate(&self) -> Result<(), ValuationError> {
        self.inputs().validate()?;

        if self.market_data.timeout_secs == 0 {
            return Err(ValuationError::Configuration(
                "market_data.timeout_secs must be positive".to_string(),
            ));
        }
        for treasury in &self.market_data.treasuries {
            if !treasury.maturity_years.is_finite()
                || treasury.maturity_years <= 0.0
                || treasury.maturity_years > MAX_MATURITY_YEARS
            {
                return Err(ValuationError::Configuration(format!(
                    "treasury {} has invalid maturity {}",
                    treasury.label, treasury.maturity_years
                )));
            }
        }
        Ok(())
    }

    /// Valuation inputs described by this configuration
    pub fn inputs(&self) -> ValuationInputs {
        ValuationInputs {
            stock_price: self.option.stock_price,
            strike_price: self.option.strike_price,
            grant_date: self.option.grant_date,
            valuation_date: self.option.valuation_date,
            expiration_date: self.option.expiration_date,
            vesting_end_date: self.option.vesting_end_date,
            public_comps: self
                .volatility
                .public_comps
                .iter()
                .map(|t| t.trim().to_string())
                .collect(),
            frequency: self.volatility.frequency,
            lookback_years: self.volatility.lookback_years,
        }
    }
}
