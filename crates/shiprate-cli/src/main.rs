mod quote;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::quote::{FranchiseArgs, RatesArgs};

#[derive(Debug, Parser)]
#[command(name = "shiprate-cli")]
#[command(about = "Shipping rate quotations from the command line")]
struct Cli {
    /// Carrier to quote against
    #[arg(long, value_enum, default_value_t = CarrierName::Fastway, global = true)]
    carrier: CarrierName,

    #[command(subcommand)]
    command: Commands,
}

/// Carriers this binary knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CarrierName {
    Fastway,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Quote every service priced for the whole shipment
    Rates(RatesArgs),
    /// Look up the pickup franchise serving a postcode
    Franchise(FranchiseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = shiprate_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.carrier {
        CarrierName::Fastway => {
            let fastway = shiprate_fastway::Fastway::from_config(&config)?;
            match cli.command {
                Commands::Rates(args) => quote::run_rates(&fastway, &args).await?,
                Commands::Franchise(args) => quote::run_franchise(&fastway, &args).await?,
            }
        }
    }

    Ok(())
}
