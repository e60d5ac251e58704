//! Aggregation layer
//!
//! Turns a flat transaction list plus a view filter into the grouped inputs
//! the analytics engine expects. Every dashboard panel reads from one
//! [`Aggregator`], so totals shown in different panels cannot drift apart.
//!
//! Amounts are read through [`Transaction::magnitude`], so a negative or
//! non-finite amount that slipped past the loader contributes zero.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{self, OutlierStats};
use crate::models::{OwnerFilter, Transaction, TransactionKind};

/// Days used to turn monthly burn into daily burn
const DAYS_PER_MONTH: f64 = 30.0;

/// Which slice of the transaction list a view covers
#[derive(Debug, Clone, Default)]
pub struct ViewFilter {
    pub owner: OwnerFilter,
    /// Case-insensitive substring over description and category
    pub search: Option<String>,
}

impl ViewFilter {
    pub fn owner(owner: OwnerFilter) -> Self {
        Self {
            owner,
            search: None,
        }
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }
}

/// Summed amount for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
    /// Share of the kind's total, 0-100
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Summed amount for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// "YYYY-MM"
    pub month: String,
    pub amount: f64,
}

/// Expenses split into essential and discretionary categories
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedsWantsSplit {
    pub needs: f64,
    pub wants: f64,
    /// Always `needs + wants`
    pub total: f64,
}

/// Lightweight reference to a transaction for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRef {
    pub id: String,
    pub description: String,
    pub amount: f64,
}

impl From<&Transaction> for TransactionRef {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            description: tx.description.clone(),
            amount: tx.magnitude(),
        }
    }
}

/// Headline numbers for the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_income: f64,
    pub total_expense: f64,
    /// Income minus expenses
    pub net: f64,
    /// Expenses divided by months elapsed in the year of `as_of`
    pub monthly_burn: f64,
    pub daily_burn: f64,
    /// `f64::INFINITY` when nothing is being spent
    pub runway_months: f64,
    pub savings_rate: f64,
}

/// Income panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub sources: Vec<CategoryTotal>,
    pub monthly_average: f64,
    /// 0-100, rounded
    pub stability_score: u8,
    pub top_source: Option<String>,
}

/// Expense panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub categories: Vec<CategoryTotal>,
    pub total: f64,
    pub split: NeedsWantsSplit,
    pub top_expense: Option<TransactionRef>,
    /// `None` when there are too few expenses for outlier analysis
    pub outliers: Option<OutlierStats>,
    /// Expenses strictly above the outlier threshold, in input order
    pub flagged: Vec<TransactionRef>,
}

/// Everything the dashboard renders for one view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filter: String,
    pub as_of: NaiveDate,
    pub transaction_count: usize,
    pub overview: Overview,
    pub income: IncomeSummary,
    pub expenses: ExpenseSummary,
    pub income_by_month: Vec<MonthlyTotal>,
    pub expense_by_month: Vec<MonthlyTotal>,
    /// Slope of monthly income totals, oldest month first
    pub income_trend: f64,
    /// Slope of monthly expense totals; positive means spending is rising
    pub expense_trend: f64,
}

/// A filtered view over a transaction list
pub struct Aggregator<'a> {
    filter: ViewFilter,
    transactions: Vec<&'a Transaction>,
}

impl<'a> Aggregator<'a> {
    /// Apply the owner and search filters, keeping input order
    pub fn new(all: &'a [Transaction], filter: &ViewFilter) -> Self {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let transactions: Vec<&Transaction> = all
            .iter()
            .filter(|t| filter.owner.matches(t.owner))
            .filter(|t| needle.as_deref().map_or(true, |n| t.matches_search(n)))
            .collect();

        debug!(
            total = all.len(),
            selected = transactions.len(),
            owner = %filter.owner,
            "Built transaction view"
        );

        Self {
            filter: filter.clone(),
            transactions,
        }
    }

    /// Transactions in this view
    pub fn transactions(&self) -> &[&'a Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn of_kind(&self, kind: TransactionKind) -> impl Iterator<Item = &'a Transaction> + '_ {
        self.transactions
            .iter()
            .copied()
            .filter(move |t| t.kind == kind)
    }

    /// Sum of amounts of one kind
    pub fn total(&self, kind: TransactionKind) -> f64 {
        self.of_kind(kind).map(Transaction::magnitude).sum()
    }

    /// Category totals ranked by amount, largest first.
    ///
    /// Equal amounts keep the order in which their categories first appeared.
    pub fn by_category(&self, kind: TransactionKind) -> Vec<CategoryTotal> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut ranked: Vec<CategoryTotal> = Vec::new();

        for tx in self.of_kind(kind) {
            let slot = *index.entry(tx.category.as_str()).or_insert_with(|| {
                ranked.push(CategoryTotal {
                    name: tx.category.clone(),
                    amount: 0.0,
                    percentage: 0.0,
                    transaction_count: 0,
                });
                ranked.len() - 1
            });
            ranked[slot].amount += tx.magnitude();
            ranked[slot].transaction_count += 1;
        }

        let total: f64 = ranked.iter().map(|c| c.amount).sum();
        for cat in &mut ranked {
            cat.percentage = if total > 0.0 {
                cat.amount / total * 100.0
            } else {
                0.0
            };
        }

        // sort_by is stable, so ties stay in first-seen order
        ranked.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Month totals, oldest month first
    pub fn by_month(&self, kind: TransactionKind) -> Vec<MonthlyTotal> {
        let mut months: BTreeMap<String, f64> = BTreeMap::new();
        for tx in self.of_kind(kind) {
            *months.entry(tx.month_key()).or_insert(0.0) += tx.magnitude();
        }
        months
            .into_iter()
            .map(|(month, amount)| MonthlyTotal { month, amount })
            .collect()
    }

    /// Month totals as a chronological series
    pub fn monthly_series(&self, kind: TransactionKind) -> Vec<f64> {
        self.by_month(kind).into_iter().map(|m| m.amount).collect()
    }

    /// Slope of the monthly series (amount per month)
    pub fn trend(&self, kind: TransactionKind) -> f64 {
        analytics::trend_slope(&self.monthly_series(kind))
    }

    /// 0-100 stability of month totals
    pub fn stability_score(&self, kind: TransactionKind) -> f64 {
        analytics::stability_score(&self.monthly_series(kind))
    }

    /// Split expenses by membership of `needs`.
    ///
    /// Matching is exact on the category label.
    pub fn needs_wants<S: AsRef<str>>(&self, needs: &[S]) -> NeedsWantsSplit {
        let needs_set: HashSet<&str> = needs.iter().map(|s| s.as_ref()).collect();

        let (mut need_total, mut want_total) = (0.0, 0.0);
        for tx in self.of_kind(TransactionKind::Expense) {
            if needs_set.contains(tx.category.as_str()) {
                need_total += tx.magnitude();
            } else {
                want_total += tx.magnitude();
            }
        }

        NeedsWantsSplit {
            needs: need_total,
            wants: want_total,
            total: need_total + want_total,
        }
    }

    /// Largest single transaction of a kind.
    ///
    /// Strict comparison, so the earliest of equal amounts wins. Zero amounts
    /// never qualify.
    pub fn top_transaction(&self, kind: TransactionKind) -> Option<&'a Transaction> {
        let mut top: Option<&Transaction> = None;
        let mut max = 0.0;
        for tx in self.of_kind(kind) {
            let amount = tx.magnitude();
            if amount > max {
                max = amount;
                top = Some(tx);
            }
        }
        top
    }

    /// Outlier statistics over individual amounts of a kind
    pub fn outlier_stats(&self, kind: TransactionKind) -> Option<OutlierStats> {
        let amounts: Vec<f64> = self.of_kind(kind).map(|t| t.amount).collect();
        analytics::outlier_stats(&amounts)
    }

    /// Transactions of a kind above the outlier threshold
    pub fn outliers(&self, kind: TransactionKind) -> Vec<&'a Transaction> {
        match self.outlier_stats(kind) {
            Some(stats) => self
                .of_kind(kind)
                .filter(|t| stats.exceeds(t.magnitude()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Headline numbers as of a date
    pub fn overview(&self, as_of: NaiveDate) -> Overview {
        let total_income = self.total(TransactionKind::Income);
        let total_expense = self.total(TransactionKind::Expense);
        let net = total_income - total_expense;

        let months_elapsed = as_of.month().max(1) as f64;
        let monthly_burn = total_expense / months_elapsed;

        let overview = Overview {
            total_income,
            total_expense,
            net,
            monthly_burn,
            daily_burn: monthly_burn / DAYS_PER_MONTH,
            runway_months: analytics::runway_months(net, monthly_burn),
            savings_rate: analytics::savings_rate(total_income, total_expense),
        };

        debug!(
            net = overview.net,
            monthly_burn = overview.monthly_burn,
            runway = overview.runway_months,
            savings_rate = overview.savings_rate,
            "Computed overview"
        );
        overview
    }

    pub fn income_summary(&self) -> IncomeSummary {
        let sources = self.by_category(TransactionKind::Income);
        let series = self.monthly_series(TransactionKind::Income);

        IncomeSummary {
            top_source: sources.first().map(|s| s.name.clone()),
            sources,
            monthly_average: analytics::mean(&series),
            stability_score: analytics::stability_score(&series).round() as u8,
        }
    }

    pub fn expense_summary<S: AsRef<str>>(&self, needs: &[S]) -> ExpenseSummary {
        let split = self.needs_wants(needs);
        let outliers = self.outlier_stats(TransactionKind::Expense);
        let flagged: Vec<TransactionRef> = self
            .outliers(TransactionKind::Expense)
            .into_iter()
            .map(TransactionRef::from)
            .collect();

        if !flagged.is_empty() {
            debug!(count = flagged.len(), "Flagged unusual expenses");
        }

        ExpenseSummary {
            categories: self.by_category(TransactionKind::Expense),
            total: split.total,
            split,
            top_expense: self
                .top_transaction(TransactionKind::Expense)
                .map(TransactionRef::from),
            outliers,
            flagged,
        }
    }

    /// Every panel for this view
    pub fn dashboard<S: AsRef<str>>(&self, as_of: NaiveDate, needs: &[S]) -> Dashboard {
        Dashboard {
            filter: self.filter.owner.to_string(),
            as_of,
            transaction_count: self.len(),
            overview: self.overview(as_of),
            income: self.income_summary(),
            expenses: self.expense_summary(needs),
            income_by_month: self.by_month(TransactionKind::Income),
            expense_by_month: self.by_month(TransactionKind::Expense),
            income_trend: self.trend(TransactionKind::Income),
            expense_trend: self.trend(TransactionKind::Expense),
        }
    }
}
