//! Dashboard and report command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use finos_core::{
    AnalyticsConfig, Aggregator, CategoryTotal, Dashboard, OwnerFilter, Transaction,
    TransactionKind, ViewFilter,
};

use super::{money, truncate};

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

pub fn cmd_dashboard(
    transactions: &[Transaction],
    filter: &ViewFilter,
    as_of: NaiveDate,
    analytics: &AnalyticsConfig,
    json: bool,
) -> Result<()> {
    let view = Aggregator::new(transactions, filter);
    let dash = view.dashboard(as_of, &analytics.needs);

    if json {
        let out = serde_json::to_string_pretty(&dash).context("Failed to serialize dashboard")?;
        println!("{}", out);
        return Ok(());
    }

    print_dashboard(&dash);
    Ok(())
}

fn print_dashboard(dash: &Dashboard) {
    let o = &dash.overview;

    println!();
    println!("📊 FinOS Dashboard");
    println!(
        "   View: {} · As of {} · {} transactions",
        dash.filter, dash.as_of, dash.transaction_count
    );
    println!("{}", RULE);

    if dash.transaction_count == 0 {
        println!("   No transactions match this view.");
        return;
    }

    println!("   {:16} {:>14}", "Income", money(o.total_income));
    println!("   {:16} {:>14}", "Expenses", money(o.total_expense));
    println!("   {:16} {:>14}", "Net", money(o.net));
    println!("   {:16} {:>14}", "Monthly burn", money(o.monthly_burn));
    println!("   {:16} {:>14}", "Daily burn", money(o.daily_burn));
    println!("   {:16} {:>14}", "Runway", runway_label(o.runway_months));
    println!("   {:16} {:>13.1}%", "Savings rate", o.savings_rate);

    let income = &dash.income;
    println!();
    println!("💰 Income");
    println!("{}", RULE);
    println!("   Monthly average: {}", money(income.monthly_average));
    println!("   Stability: {}/100", income.stability_score);
    if let Some(source) = &income.top_source {
        println!("   Top source: {}", source);
    }
    print_categories(&income.sources);

    let expenses = &dash.expenses;
    let split = &expenses.split;
    println!();
    println!("💸 Expenses");
    println!("{}", RULE);
    println!(
        "   Needs: {} ({:.1}%)   Wants: {} ({:.1}%)",
        money(split.needs),
        share(split.needs, split.total),
        money(split.wants),
        share(split.wants, split.total)
    );
    if let Some(top) = &expenses.top_expense {
        println!("   Largest: {} ({})", truncate(&top.description, 40), money(top.amount));
    }
    print_categories(&expenses.categories);

    if !expenses.flagged.is_empty() {
        println!();
        println!("   ⚠️  Unusual expenses:");
        for tx in &expenses.flagged {
            println!("      {:40} {:>12}", truncate(&tx.description, 40), money(tx.amount));
        }
    }

    println!();
    println!("📈 Trends");
    println!("{}", RULE);
    println!("   Income:   {}", slope_label(dash.income_trend));
    println!("   Expenses: {}", slope_label(dash.expense_trend));
}

pub fn cmd_categories(
    transactions: &[Transaction],
    owner: OwnerFilter,
    kind: TransactionKind,
) -> Result<()> {
    let view = Aggregator::new(transactions, &ViewFilter::owner(owner));
    let categories = view.by_category(kind);

    println!();
    println!("📊 {} by Category ({})", title(kind), owner);
    println!("{}", RULE);

    if categories.is_empty() {
        println!("   No {} found.", kind);
        return Ok(());
    }

    println!("   Total: {}", money(view.total(kind)));
    print_categories(&categories);
    Ok(())
}

pub fn cmd_trend(
    transactions: &[Transaction],
    owner: OwnerFilter,
    kind: TransactionKind,
) -> Result<()> {
    let view = Aggregator::new(transactions, &ViewFilter::owner(owner));
    let months = view.by_month(kind);

    println!();
    println!("📈 {} Trend ({})", title(kind), owner);
    println!("{}", RULE);

    if months.is_empty() {
        println!("   No {} found.", kind);
        return Ok(());
    }

    println!("   {:10} │ {:>14}", "Month", "Amount");
    println!("   ───────────┼───────────────");
    for month in &months {
        println!("   {:10} │ {:>14}", month.month, money(month.amount));
    }
    println!();
    println!("   Slope: {}", slope_label(view.trend(kind)));
    if kind == TransactionKind::Income {
        println!(
            "   Stability: {:.0}/100",
            view.stability_score(TransactionKind::Income)
        );
    }
    Ok(())
}

pub fn cmd_outliers(transactions: &[Transaction], owner: OwnerFilter) -> Result<()> {
    let view = Aggregator::new(transactions, &ViewFilter::owner(owner));

    println!();
    println!("🔍 Unusual Expenses ({})", owner);
    println!("{}", RULE);

    let Some(stats) = view.outlier_stats(TransactionKind::Expense) else {
        println!("   Not enough expenses to analyze.");
        return Ok(());
    };

    println!(
        "   Mean: {}   Std dev: {}   Threshold: {}",
        money(stats.mean),
        money(stats.std_dev),
        money(stats.threshold)
    );

    let flagged = view.outliers(TransactionKind::Expense);
    if flagged.is_empty() {
        println!("   Nothing above the threshold.");
        return Ok(());
    }

    println!();
    println!(
        "   {:10} │ {:30} │ {:15} │ {:>12}",
        "Date", "Description", "Category", "Amount"
    );
    println!("   ───────────┼────────────────────────────────┼─────────────────┼─────────────");
    for tx in flagged {
        println!(
            "   {:10} │ {:30} │ {:15} │ {:>12}",
            tx.occurred_at.date_naive(),
            truncate(&tx.description, 30),
            truncate(&tx.category, 15),
            money(tx.magnitude())
        );
    }
    Ok(())
}

fn print_categories(categories: &[CategoryTotal]) {
    if categories.is_empty() {
        return;
    }
    println!();
    println!(
        "   {:25} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼──────────────┼────────┼───────");
    for cat in categories {
        println!(
            "   {:25} │ {:>12} │ {:>5.1}% │ {:>5}",
            truncate(&cat.name, 25),
            money(cat.amount),
            cat.percentage,
            cat.transaction_count
        );
    }
}

fn title(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Income",
        TransactionKind::Expense => "Expenses",
    }
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Human-readable runway
pub fn runway_label(months: f64) -> String {
    if months.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.1} months", months)
    }
}

/// Slope with a direction arrow
pub fn slope_label(slope: f64) -> String {
    let arrow = if slope > 0.0 {
        "↑"
    } else if slope < 0.0 {
        "↓"
    } else {
        "→"
    };
    format!("{} {}/month", arrow, money(slope))
}
