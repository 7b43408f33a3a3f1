//! Budget allocation
//!
//! Turns transaction history into a proposed monthly goal per category:
//! average monthly income × spending share, split in proportion to each
//! category's historical spending.

use std::collections::BTreeMap;

use tracing::info;

use crate::models::{Budgets, Transaction};
use crate::policy::BudgetPolicy;

/// Derives a category budget from history
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocator {
    policy: BudgetPolicy,
}

impl BudgetAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: BudgetPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BudgetPolicy {
        &self.policy
    }

    /// Propose a budget
    ///
    /// - Empty history yields an empty budget.
    /// - Without any spending, the policy's default split is applied to the
    ///   budgetable total (unrounded).
    /// - Otherwise every category with spending gets its share of the total,
    ///   rounded to the nearest `rounding_increment`. Categories that never
    ///   had spending are not included.
    pub fn generate(&self, history: &[Transaction]) -> Budgets {
        if history.is_empty() {
            return Budgets::new();
        }

        let income = average_monthly_income(history).unwrap_or(self.policy.default_monthly_income);
        let budgetable = income * self.policy.spending_share;

        let expenses = spending_by_category(history);
        let total_spent: f64 = expenses.values().sum();

        if total_spent <= 0.0 {
            info!(
                budgetable,
                "No spending history, using default budget split"
            );
            return self
                .policy
                .default_split
                .iter()
                .map(|slice| (slice.category.clone(), budgetable * slice.share))
                .collect();
        }

        let increment = self.policy.rounding_increment;
        let budgets: Budgets = expenses
            .into_iter()
            .filter(|(_, spent)| *spent > 0.0)
            .map(|(category, spent)| {
                let goal = (budgetable * spent / total_spent / increment).round() * increment;
                (category, goal)
            })
            .collect();

        info!(
            categories = budgets.len(),
            average_income = income,
            budgetable,
            "Generated budget from spending history"
        );

        budgets
    }
}

/// Generate a budget with the default policy
pub fn generate_budget(history: &[Transaction]) -> Budgets {
    BudgetAllocator::new().generate(history)
}

/// Average of per-month income totals, over months that had income
///
/// Months are the `YYYY-MM` prefix of the timestamp. `None` without income.
pub fn average_monthly_income(history: &[Transaction]) -> Option<f64> {
    let mut by_month: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in history.iter().filter(|tx| tx.is_income()) {
        *by_month.entry(tx.month_key()).or_default() += tx.amount;
    }

    if by_month.is_empty() {
        return None;
    }

    Some(by_month.values().sum::<f64>() / by_month.len() as f64)
}

/// Total spending per category across all of history
pub fn spending_by_category(history: &[Transaction]) -> BTreeMap<String, f64> {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for tx in history.iter().filter(|tx| tx.is_spending()) {
        *by_category.entry(tx.category.clone()).or_default() += tx.amount;
    }
    by_category
}
