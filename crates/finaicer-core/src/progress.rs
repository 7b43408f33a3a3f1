//! Budget progress for a single month

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Budgets, Transaction};

/// Spend vs. goal for one budgeted category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: String,
    pub spent: f64,
    pub goal: f64,
    /// Percentage of the goal used (0 when the goal is 0)
    pub usage_percent: f64,
    /// Negative once over budget
    pub remaining: f64,
    pub over_budget: bool,
}

/// Month summary across all budgeted categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    /// `YYYY-MM`
    pub month: String,
    pub total_budget: f64,
    pub total_spent: f64,
    pub usage_percent: f64,
    pub remaining: f64,
    /// Sorted by category name
    pub categories: Vec<CategoryProgress>,
}

fn usage(spent: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        spent / goal * 100.0
    } else {
        0.0
    }
}

/// Compare this month's spending against the budget
///
/// Only spending whose timestamp starts with `month` counts. The overall
/// total only includes categories that have a non-zero goal.
pub fn budget_progress(history: &[Transaction], budgets: &Budgets, month: &str) -> BudgetReport {
    let mut spent_by_category: HashMap<&str, f64> = HashMap::new();
    for tx in history
        .iter()
        .filter(|tx| tx.is_spending() && tx.timestamp.starts_with(month))
    {
        *spent_by_category.entry(tx.category.as_str()).or_default() += tx.amount;
    }

    // Budgets is ordered, so categories come out sorted
    let categories: Vec<CategoryProgress> = budgets
        .iter()
        .map(|(category, &goal)| {
            let spent = spent_by_category.get(category.as_str()).copied().unwrap_or(0.0);
            let usage_percent = usage(spent, goal);
            CategoryProgress {
                category: category.clone(),
                spent,
                goal,
                usage_percent,
                remaining: goal - spent,
                over_budget: usage_percent > 100.0,
            }
        })
        .collect();

    let total_budget: f64 = budgets.values().sum();
    let total_spent: f64 = categories
        .iter()
        .filter(|c| c.goal > 0.0)
        .map(|c| c.spent)
        .sum();

    BudgetReport {
        month: month.to_string(),
        total_budget,
        total_spent,
        usage_percent: usage(total_spent, total_budget),
        remaining: total_budget - total_spent,
        categories,
    }
}
