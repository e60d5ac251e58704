//! FinOS Core Library
//!
//! Shared functionality for the FinOS personal finance dashboard:
//! - Transaction and loan models
//! - Analytics engine (runway, savings rate, outlier stats, trend slope)
//! - Aggregation layer feeding the engine from filtered transaction views
//! - PIN lock state machine with attempt counting and timed lockout
//! - Config loading and boundary record loaders (CSV/JSON)

pub mod aggregate;
pub mod analytics;
pub mod config;
pub mod error;
pub mod loans;
pub mod lock;
pub mod models;
pub mod records;

/// Transaction builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    Aggregator, CategoryTotal, Dashboard, ExpenseSummary, IncomeSummary, MonthlyTotal,
    NeedsWantsSplit, Overview, TransactionRef, ViewFilter,
};
pub use analytics::OutlierStats;
pub use config::{AnalyticsConfig, DisplayConfig, FinosConfig, LockConfig};
pub use error::{Error, Result};
pub use loans::{LoanProgress, LoanSummary};
pub use lock::{InactivityTimer, LockSession, LockState, Pin, PressOutcome};
pub use models::{Loan, Owner, OwnerFilter, Transaction, TransactionKind};
