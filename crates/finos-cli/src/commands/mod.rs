//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Resolved configuration display
//! - `dashboard` - Dashboard, category, trend, and outlier reports
//! - `loans` - Loan payoff report
//! - `lock` - Interactive PIN gate
//! - `shell` - Interactive session with idle relock

pub mod config;
pub mod dashboard;
pub mod loans;
pub mod lock;
pub mod shell;

// Re-export command functions for main.rs
pub use config::*;
pub use dashboard::*;
pub use loans::*;
pub use lock::*;
pub use shell::*;

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use finos_core::config::DEFAULT_CURRENCY;
use finos_core::records;
use finos_core::{FinosConfig, Transaction, ViewFilter};

use crate::cli::Commands;

static CURRENCY: OnceLock<String> = OnceLock::new();

/// Set the report currency symbol once at startup
pub fn set_currency(symbol: &str) {
    let _ = CURRENCY.set(symbol.to_string());
}

fn currency() -> &'static str {
    CURRENCY.get().map(String::as_str).unwrap_or(DEFAULT_CURRENCY)
}

/// Run one already-unlocked command
pub fn run_command(
    command: Commands,
    data: &Path,
    config_path: Option<&Path>,
    config: &FinosConfig,
) -> Result<()> {
    match command {
        Commands::Dashboard {
            owner,
            search,
            as_of,
            json,
        } => {
            let transactions = load_records(data)?;
            let as_of = parse_as_of(as_of.as_deref())?;
            let mut filter = ViewFilter::owner(owner);
            if let Some(search) = search {
                filter = filter.with_search(search);
            }
            cmd_dashboard(&transactions, &filter, as_of, &config.analytics, json)
        }
        Commands::Categories { kind, owner } => {
            let transactions = load_records(data)?;
            cmd_categories(&transactions, owner, kind)
        }
        Commands::Trend { kind, owner } => {
            let transactions = load_records(data)?;
            cmd_trend(&transactions, owner, kind)
        }
        Commands::Outliers { owner } => {
            let transactions = load_records(data)?;
            cmd_outliers(&transactions, owner)
        }
        Commands::Loans { file, as_of, json } => {
            let as_of = parse_as_of(as_of.as_deref())?;
            cmd_loans(&file, as_of, json)
        }
        Commands::Config => cmd_config(config_path, config),
        Commands::Shell => anyhow::bail!("Already in the shell"),
    }
}

/// Load transaction records, naming the file in any error
pub fn load_records(path: &Path) -> Result<Vec<Transaction>> {
    records::load_transactions(path)
        .with_context(|| format!("Failed to load transactions from {}", path.display()))
}

/// Parse an optional `--as-of` date, defaulting to today
pub fn parse_as_of(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .context("Invalid --as-of date format (use YYYY-MM-DD)"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount in the configured currency
pub fn money(amount: f64) -> String {
    money_with(currency(), amount)
}

/// Format an amount with a currency symbol and thousands separators
pub fn money_with(symbol: &str, amount: f64) -> String {
    if !amount.is_finite() {
        return "∞".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}
