//! FinOS CLI - Household finance dashboard behind a PIN gate
//!
//! Usage:
//!   finos dashboard --owner john        Overview, income, expenses, trends
//!   finos categories --kind expense     Ranked category totals
//!   finos trend --kind income           Month totals and slope
//!   finos outliers                      Unusually large expenses
//!   finos loans --file loans.csv        Loan payoff progress
//!   finos config                        Resolved configuration
//!   finos shell                         Interactive session, relocks when idle

mod cli;
mod commands;


use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use finos_core::FinosConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = FinosConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    commands::set_currency(&config.display.currency);

    if cli.no_lock {
        tracing::warn!("PIN gate disabled with --no-lock");
    }

    match cli.command {
        Commands::Shell => {
            let gate = (!cli.no_lock).then(|| commands::Gate::new(&config.lock, Utc::now()));
            commands::run_shell(gate, &cli.data, cli.config.as_deref(), &config).await
        }
        command => {
            if command.is_gated() && !cli.no_lock {
                commands::run_lock_screen(&config.lock).await?;
            }
            commands::run_command(command, &cli.data, cli.config.as_deref(), &config)
        }
    }
}
