//! auditsweep binary.
//!
//! This binary provides the main entry point for auditsweep, which enumerates
//! every record of a date range from a capped, session-paged audit-log service.

use anyhow::Context;
use clap::Parser;
use auditsweep_core::{
    cli::commands::Commands,
    cli::{handle_fetch, handle_plan, init_logging, Cli},
    config::Settings,
};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize logging
    let logging = cli.logging.clone().with_settings(&settings.logging);
    init_logging(&logging);

    info!("auditsweep starting up");
    debug!("Effective settings: {:?}", settings);

    match cli.command {
        Commands::Plan(cmd) => handle_plan(cmd, settings).await?,
        Commands::Fetch(cmd) => {
            let summary = handle_fetch(cmd, settings).await?;
            if summary.interrupted {
                std::process::exit(130);
            }
        }
    }

    Ok(())
}
