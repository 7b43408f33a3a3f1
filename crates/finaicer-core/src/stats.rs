//! Summary statistics over the whole history

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Income minus spending
    pub total_saved: f64,
    /// Distinct categories across all transaction types
    pub category_count: usize,
    /// Whole days (rounded up) since the earliest transaction
    pub days_active: i64,
    pub transaction_count: usize,
}

pub fn profile_stats(history: &[Transaction], now: DateTime<FixedOffset>) -> ProfileStats {
    let total_saved = history.iter().fold(0.0, |acc, tx| {
        if tx.is_income() {
            acc + tx.amount
        } else if tx.is_spending() {
            acc - tx.amount
        } else {
            acc
        }
    });

    let category_count = history
        .iter()
        .map(|tx| tx.category.as_str())
        .collect::<HashSet<_>>()
        .len();

    let earliest = history
        .iter()
        .filter_map(|tx| tx.parsed_timestamp(*now.offset()))
        .min();

    let days_active = earliest
        .map(|first| {
            let seconds = (now - first).num_seconds().max(0);
            (seconds + 86_399) / 86_400
        })
        .unwrap_or(0);

    ProfileStats {
        total_saved,
        category_count,
        days_active,
        transaction_count: history.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use crate::test_utils::{expense_on, income, tx, NOON};

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(NOON).unwrap()
    }

    #[test]
    fn test_profile_stats() {
        let history = vec![
            income("i", "2024-03-01", 1_000_000.0),
            expense_on("a", "2024-03-10", "Compras", 200_000.0),
            tx("w", "2024-03-11", "ATM", 50_000.0, TransactionType::Withdrawal, "Retiro"),
            tx("t", "2024-03-12", "Nequi", 70_000.0, TransactionType::Transfer, "Compras"),
            tx("x", "sin fecha", "?", 1.0, TransactionType::Other, "Otro"),
        ];

        let stats = profile_stats(&history, now());
        assert_eq!(stats.total_saved, 750_000.0);
        assert_eq!(stats.category_count, 4);
        // 2024-03-01T00:00 to 2024-03-15T12:00 is 14.5 days
        assert_eq!(stats.days_active, 15);
        assert_eq!(stats.transaction_count, 5);
    }

    #[test]
    fn test_profile_stats_empty() {
        let stats = profile_stats(&[], now());
        assert_eq!(stats.total_saved, 0.0);
        assert_eq!(stats.category_count, 0);
        assert_eq!(stats.days_active, 0);
    }
}
