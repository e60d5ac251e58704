//! CLI argument definitions using clap
//!
//! The command implementations live in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use finos_core::{OwnerFilter, TransactionKind};

/// FinOS - Household income, spending, and loan dashboard
#[derive(Parser)]
#[command(name = "finos")]
#[command(about = "PIN-gated household finance dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transaction records (CSV or JSON, chosen by extension)
    #[arg(long, default_value = "transactions.csv", global = true)]
    pub data: PathBuf,

    /// Config file (defaults to the data-dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the PIN gate
    ///
    /// Intended for scripted use and testing only.
    #[arg(long, global = true)]
    pub no_lock: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the full dashboard: overview, income, expenses, trends
    Dashboard {
        /// Whose transactions to show (all, john, hannah, both)
        #[arg(short, long, default_value = "all")]
        owner: OwnerFilter,

        /// Only include transactions whose description or category contains TEXT
        #[arg(short, long)]
        search: Option<String>,

        /// Reference date for burn-rate math (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rank categories by total amount
    Categories {
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: TransactionKind,

        /// Whose transactions to show (all, john, hannah, both)
        #[arg(short, long, default_value = "all")]
        owner: OwnerFilter,
    },

    /// Show month totals and their trend slope
    Trend {
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: TransactionKind,

        /// Whose transactions to show (all, john, hannah, both)
        #[arg(short, long, default_value = "all")]
        owner: OwnerFilter,
    },

    /// List unusually large expenses
    Outliers {
        /// Whose transactions to show (all, john, hannah, both)
        #[arg(short, long, default_value = "all")]
        owner: OwnerFilter,
    },

    /// Show loan payoff progress
    Loans {
        /// Loan records (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration
    Config,

    /// Stay unlocked and run commands interactively
    ///
    /// The session locks again after the configured idle time.
    Shell,
}

impl Commands {
    /// Whether the command needs the PIN gate
    pub fn is_gated(&self) -> bool {
        !matches!(self, Self::Config)
    }
}

/// One line typed at the `finos shell` prompt
#[derive(Parser)]
#[command(name = "finos", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}
