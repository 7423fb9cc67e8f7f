//! CLI interface for option-valuation
//!
//! Provides subcommands for:
//! - `value`: Value the configured option grant
//! - `capture`: Fetch market data and save it as a snapshot
//! - `config`: Show the validated configuration

mod capture;
mod value;

pub use capture::CaptureArgs;
pub use value::{OutputFormat, ValueArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "option-valuation")]
#[command(about = "Black-Scholes valuation of employee stock options")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Value the configured option grant
    Value(ValueArgs),
    /// Fetch market data and save it as a snapshot
    Capture(CaptureArgs),
    /// Show the validated configuration
    Config,
}
