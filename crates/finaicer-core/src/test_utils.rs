//! Test utilities for finaicer-core
//!
//! Transaction builders and clocks shared by unit tests, the integration
//! tests and the CLI/server crates (via the `test-utils` feature).

use std::sync::Arc;

use crate::clock::{Clock, FixedClock};
use crate::models::{Transaction, TransactionType};

/// Mid-day evaluation time (outside the night window)
pub const NOON: &str = "2024-03-15T12:00:00-05:00";

/// Night evaluation time (inside the default 1-5 window)
pub const NIGHT: &str = "2024-03-15T03:00:00-05:00";

/// Timestamp well outside any duplicate window of `NOON`/`NIGHT`
pub const OLD_TIMESTAMP: &str = "2024-03-01T10:00:00";

/// Clock frozen at an RFC 3339 instant
pub fn clock_at(rfc3339: &str) -> Arc<dyn Clock> {
    Arc::new(FixedClock::parse(rfc3339).expect("valid RFC 3339 instant"))
}

/// Fully specified transaction
pub fn tx(
    id: &str,
    timestamp: &str,
    entity: &str,
    amount: f64,
    transaction_type: TransactionType,
    category: &str,
) -> Transaction {
    Transaction::new(id, timestamp, entity, amount, transaction_type, category)
}

/// Old expense with an entity unique to its id
pub fn expense(id: &str, category: &str, amount: f64) -> Transaction {
    tx(
        id,
        OLD_TIMESTAMP,
        &format!("Merchant {}", id),
        amount,
        TransactionType::Expense,
        category,
    )
}

/// Expense dated on a given day or instant
pub fn expense_on(id: &str, timestamp: &str, category: &str, amount: f64) -> Transaction {
    tx(
        id,
        timestamp,
        &format!("Merchant {}", id),
        amount,
        TransactionType::Expense,
        category,
    )
}

/// Salary deposit
pub fn income(id: &str, timestamp: &str, amount: f64) -> Transaction {
    tx(
        id,
        timestamp,
        "NOMINA EMPRESA",
        amount,
        TransactionType::Income,
        "Nómina",
    )
}
