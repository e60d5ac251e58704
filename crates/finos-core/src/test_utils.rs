//! Test utilities: terse transaction and loan builders

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{Loan, Owner, Transaction, TransactionKind};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> String {
    format!("tx_{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Builder for a [`Transaction`] with sensible defaults
pub struct TxBuilder {
    tx: Transaction,
}

impl TxBuilder {
    pub fn new(kind: TransactionKind, category: &str, amount: f64, date: NaiveDate) -> Self {
        let occurred_at = Utc
            .from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("noon is a valid time"));
        Self {
            tx: Transaction {
                id: next_id(),
                kind,
                description: format!("{} {}", category, kind),
                amount,
                category: category.to_string(),
                occurred_at,
                owner: Owner::Both,
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.tx.id = id.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.tx.description = description.to_string();
        self
    }

    pub fn owner(mut self, owner: Owner) -> Self {
        self.tx.owner = owner;
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}

/// Start an income transaction
pub fn income(category: &str, amount: f64, date: NaiveDate) -> TxBuilder {
    TxBuilder::new(TransactionKind::Income, category, amount, date)
}

/// Start an expense transaction
pub fn expense(category: &str, amount: f64, date: NaiveDate) -> TxBuilder {
    TxBuilder::new(TransactionKind::Expense, category, amount, date)
}

/// A shared loan with no dates set
pub fn loan(name: &str, total_amount: f64, current_balance: f64) -> Loan {
    Loan {
        id: next_id(),
        name: name.to_string(),
        owner: Owner::Both,
        total_amount,
        current_balance,
        due_date: None,
        next_payment_date: None,
    }
}
