//! Sticker quiz service binary.

use anyhow::{Context, Result};
use clap::Parser;
use stickerquiz::cli::{Cli, Commands};
use stickerquiz::logging::init_logging;
use stickerquiz::quiz::QuestionCatalog;
use stickerquiz::server;
use stickerquiz::services::Services;
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config().context("failed to load configuration")?;
    init_logging(Some(&config.logging)).context("failed to initialize logging")?;

    match cli.command() {
        Commands::Questions => {
            let catalog = QuestionCatalog::builtin();
            println!("{}", serde_json::to_string_pretty(catalog.questions())?);
            Ok(())
        }
        Commands::CheckConfig => match config.validate() {
            Ok(()) => {
                println!("configuration OK");
                Ok(())
            }
            Err(issues) => {
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
                anyhow::bail!("{} configuration problem(s)", issues.len())
            }
        },
        Commands::Serve { .. } => {
            if let Err(issues) = config.validate() {
                for issue in &issues {
                    error!(issue = %issue, "invalid configuration");
                }
                anyhow::bail!("{} configuration problem(s)", issues.len());
            }
            info!(version = env!("CARGO_PKG_VERSION"), "stickerquiz starting");
            let services = Services::from_config(config).context("failed to build services")?;
            server::serve(services, shutdown_signal())
                .await
                .context("server error")?;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c; shutting down"),
    }
}
