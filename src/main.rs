use anyhow::Context;
use clap::Parser;
use option_valuation::cli::{Cli, Commands};
use option_valuation::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Could not load config from {}", cli.config))?;

    option_valuation::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Value(args) => {
            tracing::info!(config = %cli.config, "Starting valuation");
            args.execute(&config).await?;
        }
        Commands::Capture(args) => {
            tracing::info!(config = %cli.config, "Starting market data capture");
            args.execute(&config).await?;
        }
        Commands::Config => {
            let inputs = config.inputs();
            println!("Current configuration:");
            println!(
                "  Option: S={} K={}",
                inputs.stock_price, inputs.strike_price
            );
            println!(
                "  Dates: grant={} valuation={} expiration={} vesting_end={}",
                inputs.grant_date,
                inputs.valuation_date,
                inputs.expiration_date,
                inputs.vesting_end_date
            );
            println!(
                "  Comps: {} ({})",
                inputs.public_comps.join(", "),
                inputs.frequency.as_str()
            );
            match inputs.lookback_years {
                Some(years) => println!("  Lookback: {} years", years),
                None => println!("  Lookback: rounded years to maturity"),
            }
            for t in &config.market_data.treasuries {
                println!("  Treasury: {} {} ({}y)", t.label, t.ticker, t.maturity_years);
            }
            println!("  Output: {:?}", config.output.dir);
        }
    }

    Ok(())
}
