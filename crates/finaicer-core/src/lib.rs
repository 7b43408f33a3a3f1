//! FinAicer Core Library
//!
//! Shared functionality for the FinAicer personal finance assistant:
//! - Anomaly detection over classified transactions
//! - Budget allocation from spending history
//! - Policy configuration (thresholds, windows, default split)
//! - Import of classifier output, histories and budgets
//! - In-memory ledger that records transactions and alerts
//! - Budget progress and profile statistics

pub mod budget;
pub mod clock;
pub mod detect;
pub mod error;
pub mod format;
pub mod import;
pub mod ledger;
pub mod models;
pub mod policy;
pub mod progress;
pub mod stats;

/// Transaction builders and fixed clocks for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use budget::{generate_budget, BudgetAllocator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use detect::{evaluate_anomalies, AnomalyEngine};
pub use error::{Error, Result};
pub use format::format_amount;
pub use import::ClassifiedTransaction;
pub use ledger::{Ledger, LedgerState};
pub use models::{
    Alert, AlertRule, AlertSeverity, AlertType, Budgets, Transaction, TransactionType,
};
pub use policy::{AnomalyPolicy, BudgetPolicy, DefaultAllocation, PolicyConfig};
pub use progress::{budget_progress, BudgetReport, CategoryProgress};
pub use stats::{profile_stats, ProfileStats};
