//! Loan payoff tracking
//!
//! Summarizes how far each loan has been paid down and how much time is left
//! until its target date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Loan, Owner};

/// Progress on a single loan as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProgress {
    pub id: String,
    pub name: String,
    pub owner: Owner,
    pub total_amount: f64,
    pub current_balance: f64,
    /// Share already repaid, 0-100
    pub progress: f64,
    /// Whole months until the due date (negative once overdue)
    pub months_left: Option<i64>,
    pub days_to_next_payment: Option<i64>,
}

/// All loans together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub total_debt: f64,
    pub total_original: f64,
    /// Share of the original principal repaid across all loans, 0-100
    pub progress: f64,
    /// Ordered by due date, undated loans last
    pub loans: Vec<LoanProgress>,
}

/// Repaid share of `total`, 0 when there was nothing to repay
pub fn paid_percentage(total: f64, balance: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (total - balance) / total * 100.0
}

/// Whole calendar months from `from` to `to`, truncated toward zero
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months =
        (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64);
    if months > 0 && to.day() < from.day() {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}

impl LoanProgress {
    pub fn new(loan: &Loan, as_of: NaiveDate) -> Self {
        Self {
            id: loan.id.clone(),
            name: loan.name.clone(),
            owner: loan.owner,
            total_amount: loan.total_amount,
            current_balance: loan.current_balance,
            progress: paid_percentage(loan.total_amount, loan.current_balance),
            months_left: loan.due_date.map(|due| months_between(as_of, due)),
            days_to_next_payment: loan
                .next_payment_date
                .map(|next| (next - as_of).num_days()),
        }
    }
}

impl LoanSummary {
    pub fn new(loans: &[Loan], as_of: NaiveDate) -> Self {
        let total_debt: f64 = loans.iter().map(|l| l.current_balance).sum();
        let total_original: f64 = loans.iter().map(|l| l.total_amount).sum();

        let mut ordered: Vec<&Loan> = loans.iter().collect();
        ordered.sort_by_key(|l| (l.due_date.is_none(), l.due_date));

        Self {
            total_debt,
            total_original,
            progress: paid_percentage(total_original, total_debt),
            loans: ordered
                .into_iter()
                .map(|l| LoanProgress::new(l, as_of))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::loan;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_paid_percentage() {
        assert_eq!(paid_percentage(1000.0, 250.0), 75.0);
        assert_eq!(paid_percentage(0.0, 0.0), 0.0);
        assert_eq!(paid_percentage(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2026, 1, 15), date(2026, 4, 15)), 3);
        assert_eq!(months_between(date(2026, 1, 15), date(2026, 4, 14)), 2);
        assert_eq!(months_between(date(2026, 1, 15), date(2027, 1, 20)), 12);
        assert_eq!(months_between(date(2026, 4, 15), date(2026, 1, 20)), -2);
        assert_eq!(months_between(date(2026, 4, 15), date(2026, 4, 1)), 0);
    }

    #[test]
    fn test_summary_totals_and_order() {
        let mut car = loan("Car", 20000.0, 5000.0);
        car.due_date = Some(date(2027, 6, 1));
        let mut phone = loan("Phone", 1000.0, 1000.0);
        phone.due_date = Some(date(2026, 9, 1));
        phone.next_payment_date = Some(date(2026, 2, 5));
        let family = loan("Family", 3000.0, 0.0);

        let summary = LoanSummary::new(&[car, family, phone], date(2026, 2, 1));

        assert_eq!(summary.total_debt, 6000.0);
        assert_eq!(summary.total_original, 24000.0);
        assert_eq!(summary.progress, 75.0);

        let names: Vec<&str> = summary.loans.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Phone", "Car", "Family"]);

        let phone = &summary.loans[0];
        assert_eq!(phone.progress, 0.0);
        assert_eq!(phone.months_left, Some(7));
        assert_eq!(phone.days_to_next_payment, Some(4));
        assert_eq!(summary.loans[2].months_left, None);
    }

    #[test]
    fn test_empty_summary() {
        let summary = LoanSummary::new(&[], date(2026, 1, 1));
        assert_eq!(summary.progress, 0.0);
        assert!(summary.loans.is_empty());
    }
}
