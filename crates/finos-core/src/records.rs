//! Record loaders for transaction and loan lists
//!
//! This is the validation boundary: whatever supplies the records (a sync
//! export, a hand-edited file) is untrusted, so malformed rows and negative
//! amounts are rejected here. Everything past this module assumes clean data.
//!
//! Transaction columns / keys: `id,type,description,amount,category,created_at,owner`
//! Loan columns / keys: `id,name,owner,total_amount,current_balance,due_date,next_payment_date`

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Loan, Owner, Transaction, TransactionKind, UNCATEGORIZED};

/// Supported record file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: Option<String>,
    amount: f64,
    #[serde(default)]
    category: Option<String>,
    created_at: String,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLoan {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    owner: Option<String>,
    total_amount: f64,
    current_balance: f64,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    next_payment_date: Option<String>,
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = parse_date(s)?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidData(format!("Invalid date: {}", s)))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidData(format!("Invalid date: {}", s)))
}

fn parse_optional_date(s: Option<String>) -> Result<Option<NaiveDate>> {
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(d) => parse_date(d).map(Some),
    }
}

fn parse_owner(s: Option<String>) -> Result<Owner> {
    s.as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(Error::InvalidData)
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidData(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value)
}

fn with_row<T>(row: usize, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        Error::InvalidData(msg) => Error::InvalidData(format!("record {}: {}", row, msg)),
        other => other,
    })
}

impl RawTransaction {
    fn into_transaction(self, row: usize) -> Result<Transaction> {
        let kind: TransactionKind = self.kind.parse().map_err(Error::InvalidData)?;
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());

        Ok(Transaction {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("row-{}", row)),
            kind,
            description: self.description.unwrap_or_default().trim().to_string(),
            amount: non_negative("amount", self.amount)?,
            category,
            occurred_at: parse_timestamp(&self.created_at)?,
            owner: parse_owner(self.owner)?,
        })
    }
}

impl RawLoan {
    fn into_loan(self, row: usize) -> Result<Loan> {
        Ok(Loan {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("loan-{}", row)),
            name: self.name.trim().to_string(),
            owner: parse_owner(self.owner)?,
            total_amount: non_negative("total_amount", self.total_amount)?,
            current_balance: non_negative("current_balance", self.current_balance)?,
            due_date: parse_optional_date(self.due_date)?,
            next_payment_date: parse_optional_date(self.next_payment_date)?,
        })
    }
}

fn read_csv<R: Read, T: serde::de::DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Parse transactions from CSV with a header row
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let raw: Vec<RawTransaction> = read_csv(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| with_row(i + 1, r.into_transaction(i + 1)))
        .collect()
}

/// Parse transactions from a JSON array
pub fn parse_transactions_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let raw: Vec<RawTransaction> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| with_row(i + 1, r.into_transaction(i + 1)))
        .collect()
}

/// Parse loans from CSV with a header row
pub fn parse_loans_csv<R: Read>(reader: R) -> Result<Vec<Loan>> {
    let raw: Vec<RawLoan> = read_csv(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| with_row(i + 1, r.into_loan(i + 1)))
        .collect()
}

/// Parse loans from a JSON array
pub fn parse_loans_json<R: Read>(reader: R) -> Result<Vec<Loan>> {
    let raw: Vec<RawLoan> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| with_row(i + 1, r.into_loan(i + 1)))
        .collect()
}

/// Load a transaction file, format chosen by extension
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let format = RecordFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let transactions = match format {
        RecordFormat::Csv => parse_transactions_csv(reader)?,
        RecordFormat::Json => parse_transactions_json(reader)?,
    };
    info!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Load a loan file, format chosen by extension
pub fn load_loans(path: &Path) -> Result<Vec<Loan>> {
    let format = RecordFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let loans = match format {
        RecordFormat::Csv => parse_loans_csv(reader)?,
        RecordFormat::Json => parse_loans_json(reader)?,
    };
    debug!(path = %path.display(), count = loans.len(), "Loaded loans");
    Ok(loans)
}
