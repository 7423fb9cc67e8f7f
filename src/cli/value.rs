//! Value command implementation

use crate::config::Config;
use crate::market::{MarketData, YahooClient};
use crate::report::{build_tables, render_table, ParquetReportWriter};
use crate::valuation::{self, ValuationResult};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One Parquet file per report table
    Parquet,
    /// Plain-text tables on stdout
    Table,
    /// Full result as JSON on stdout
    Json,
}

#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Use a captured market data snapshot instead of fetching
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "parquet")]
    pub format: OutputFormat,

    /// Output directory for Parquet reports (overrides the config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ValueArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let inputs = config.inputs();

        let result = match &self.snapshot {
            Some(path) => {
                tracing::info!(path = ?path, "Valuing from market data snapshot");
                let market = MarketData::load(path)?;
                valuation::value(&inputs, &market)?
            }
            None => {
                let client = YahooClient::with_config(config.market_data.yahoo())
                    .context("Failed to create market data client")?;
                valuation::run(&inputs, &client, &config.market_data.treasuries).await?
            }
        };

        self.emit(config, &result)
    }

    fn emit(&self, config: &Config, result: &ValuationResult) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            OutputFormat::Table => {
                for table in build_tables(result) {
                    println!("{}\n", render_table(&table));
                }
            }
            OutputFormat::Parquet => {
                let dir = self.output.clone().unwrap_or_else(|| config.output.dir.clone());
                let writer = ParquetReportWriter::new(dir);
                let paths = writer
                    .write_all(&build_tables(result))
                    .with_context(|| format!("Failed to write report to {:?}", writer.output_dir()))?;
                tracing::info!(files = paths.len(), dir = ?writer.output_dir(), "Saved valuation report");
                println!("Option valuation: {:.2}", result.fair_value);
            }
        }
        Ok(())
    }
}
