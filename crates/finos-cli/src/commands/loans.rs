//! Loan command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use finos_core::records;
use finos_core::LoanSummary;

use super::{money, truncate};

pub fn cmd_loans(file: &Path, as_of: NaiveDate, json: bool) -> Result<()> {
    let loans = records::load_loans(file)
        .with_context(|| format!("Failed to load loans from {}", file.display()))?;
    let summary = LoanSummary::new(&loans, as_of);

    if json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to serialize loans")?;
        println!("{}", out);
        return Ok(());
    }

    println!();
    println!("🏦 Loans");
    println!("   As of {}", as_of);
    println!("   ─────────────────────────────────────────────────────────────");

    if summary.loans.is_empty() {
        println!("   No loans recorded.");
        return Ok(());
    }

    println!(
        "   Total debt: {} of {} ({:.1}% repaid)",
        money(summary.total_debt),
        money(summary.total_original),
        summary.progress
    );
    println!();
    println!(
        "   {:20} │ {:8} │ {:>12} │ {:>6} │ {:>7} │ {:>9}",
        "Loan", "Owner", "Balance", "Paid", "Months", "Next due"
    );
    println!("   ─────────────────────┼──────────┼──────────────┼────────┼─────────┼──────────");
    for loan in &summary.loans {
        println!(
            "   {:20} │ {:8} │ {:>12} │ {:>5.1}% │ {:>7} │ {:>9}",
            truncate(&loan.name, 20),
            loan.owner.as_str(),
            money(loan.current_balance),
            loan.progress,
            loan.months_left
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".into()),
            next_payment_label(loan.days_to_next_payment)
        );
    }

    Ok(())
}

/// "today", "in 3d", "2d late", or "-"
pub fn next_payment_label(days: Option<i64>) -> String {
    match days {
        None => "-".to_string(),
        Some(0) => "today".to_string(),
        Some(d) if d > 0 => format!("in {}d", d),
        Some(d) => format!("{}d late", -d),
    }
}
