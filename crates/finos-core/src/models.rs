//! Domain models for FinOS

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Categories offered by the entry form
pub const CATEGORIES: &[&str] = &[
    "Housing",
    "Food",
    "Transportation",
    "Utilities",
    "Healthcare",
    "Entertainment",
    "Shopping",
    "Personal",
    "Education",
    "Debt",
    "Savings",
    "Salary",
    "Freelance",
    "Investments",
    "Gift",
    "Other Income",
    "Uncategorized",
];

/// Fallback label for blank categories
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Expense categories counted as needs unless the config says otherwise
pub const DEFAULT_NEEDS: &[&str] = &[
    "Housing",
    "Food",
    "Transportation",
    "Utilities",
    "Healthcare",
    "Debt",
];

/// Income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who a transaction or loan belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    John,
    Hannah,
    /// Shared by the household
    #[default]
    Both,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::John => "John",
            Self::Hannah => "Hannah",
            Self::Both => "Both",
        }
    }
}

impl std::str::FromStr for Owner {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "john" => Ok(Self::John),
            "hannah" => Ok(Self::Hannah),
            "both" | "" => Ok(Self::Both),
            _ => Err(format!("Unknown owner: {}", s)),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard owner filter
///
/// A single-owner filter is an equality match: `Both`-owned transactions only
/// show up under `All` or an explicit `Both` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerFilter {
    #[default]
    All,
    Only(Owner),
}

impl OwnerFilter {
    pub fn matches(&self, owner: Owner) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => *selected == owner,
        }
    }
}

impl std::str::FromStr for OwnerFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "everyone" => Ok(Self::All),
            "" => Err("Owner filter cannot be empty".to_string()),
            other => other.parse::<Owner>().map(Self::Only),
        }
    }
}

impl std::fmt::Display for OwnerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "Everyone"),
            Self::Only(owner) => write!(f, "{}", owner),
        }
    }
}

/// A single income or expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    /// Always a magnitude; the sign comes from `kind`
    pub amount: f64,
    pub category: String,
    #[serde(rename = "created_at")]
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub owner: Owner,
}

impl Transaction {
    /// Amount floored at zero, with non-finite values treated as zero
    pub fn magnitude(&self) -> f64 {
        if self.amount.is_finite() {
            self.amount.max(0.0)
        } else {
            0.0
        }
    }

    /// Calendar bucket key, e.g. "2026-03"
    pub fn month_key(&self) -> String {
        self.occurred_at.format("%Y-%m").to_string()
    }

    /// Case-insensitive match against description or category.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

/// A loan being paid down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Owner,
    pub total_amount: f64,
    pub current_balance: f64,
    /// Target payoff date
    pub due_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
}
