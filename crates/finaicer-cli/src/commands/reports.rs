//! Report command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use finaicer_core::import::{load_budgets, load_history};
use finaicer_core::{budget_progress, format_amount, profile_stats, BudgetReport, ProfileStats};

use super::truncate;

/// Resolve a `YYYY-MM` month, defaulting to the current one
pub fn resolve_month(month: Option<&str>) -> Result<String> {
    match month {
        Some(month) => {
            if month.len() != 7 {
                anyhow::bail!("Invalid --month format (use YYYY-MM): {}", month);
            }
            NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
                .with_context(|| format!("Invalid --month format (use YYYY-MM): {}", month))?;
            Ok(month.to_string())
        }
        None => Ok(Local::now().format("%Y-%m").to_string()),
    }
}

pub fn progress_report(
    history_path: &Path,
    budgets_path: &Path,
    month: Option<&str>,
) -> Result<BudgetReport> {
    let month = resolve_month(month)?;
    let history = load_history(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;
    let budgets = load_budgets(budgets_path)
        .with_context(|| format!("Failed to load budgets from {}", budgets_path.display()))?;

    Ok(budget_progress(&history, &budgets, &month))
}

pub fn cmd_progress(
    history_path: &Path,
    budgets_path: &Path,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let report = progress_report(history_path, budgets_path, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Budget Progress");
    println!("   Month: {}", report.month);
    println!("   ─────────────────────────────────────────────────────────────");

    if report.categories.is_empty() {
        println!("   No budget set.");
        return Ok(());
    }

    println!(
        "   {:22} │ {:>12} │ {:>12} │ {:>6}",
        "Category", "Spent", "Goal", "Used"
    );
    println!("   ───────────────────────┼──────────────┼──────────────┼───────");
    for category in &report.categories {
        let flag = if category.over_budget { " ⚠️" } else { "" };
        println!(
            "   {:22} │ {:>12} │ {:>12} │ {:>5.0}%{}",
            truncate(&category.category, 22),
            format_amount(category.spent),
            format_amount(category.goal),
            category.usage_percent,
            flag
        );
    }
    println!("   ───────────────────────┼──────────────┼──────────────┼───────");
    println!(
        "   {:22} │ {:>12} │ {:>12} │ {:>5.0}%",
        "Total",
        format_amount(report.total_spent),
        format_amount(report.total_budget),
        report.usage_percent
    );
    println!();
    if report.remaining >= 0.0 {
        println!("   💵 {} left this month", format_amount(report.remaining));
    } else {
        println!("   🔥 {} over budget", format_amount(-report.remaining));
    }

    Ok(())
}

pub fn stats_report(history_path: &Path) -> Result<ProfileStats> {
    let history = load_history(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;
    Ok(profile_stats(&history, Local::now().fixed_offset()))
}

pub fn cmd_stats(history_path: &Path, json: bool) -> Result<()> {
    let stats = stats_report(history_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📈 Statistics");
    println!("   ─────────────────────────────────────────────");
    println!("   Total saved:   {}", format_amount(stats.total_saved));
    println!("   Categories:    {}", stats.category_count);
    println!("   Days active:   {}", stats.days_active);
    println!("   Transactions:  {}", stats.transaction_count);

    Ok(())
}
