//! Capture command implementation

use crate::config::Config;
use crate::market::{fetch_market_data, YahooClient};
use crate::valuation;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Snapshot file to write
    #[arg(short, long, default_value = "market_data.json")]
    pub output: PathBuf,
}

impl CaptureArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let inputs = config.inputs();
        let plan = valuation::plan(&inputs)?;
        let client = YahooClient::with_config(config.market_data.yahoo())
            .context("Failed to create market data client")?;

        tracing::info!(
            start = %plan.window_start,
            end = %plan.window_end,
            output = ?self.output,
            "Capturing market data"
        );

        let market = fetch_market_data(
            &client,
            &inputs.public_comps,
            plan.window_start,
            inputs.valuation_date,
            &config.market_data.treasuries,
        )
        .await;

        market
            .save(&self.output)
            .with_context(|| format!("Failed to write snapshot {:?}", self.output))?;
        tracing::info!(
            series = market.price_series.len(),
            treasuries = market.yield_points().len(),
            "Snapshot saved"
        );
        Ok(())
    }
}
