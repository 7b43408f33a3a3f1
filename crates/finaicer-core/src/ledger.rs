//! In-memory ledger driving the engine
//!
//! Holds what the application keeps between messages: the transaction
//! history, the active budget, the last suggestion and raised alerts. Both
//! lists are kept newest first.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::budget::BudgetAllocator;
use crate::detect::AnomalyEngine;
use crate::error::{Error, Result};
use crate::import::{validate_budgets, validate_transaction};
use crate::models::{Alert, Budgets, Transaction};

/// Serializable ledger contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Active budget the threshold rule checks against
    #[serde(default)]
    pub budgets: Budgets,
    /// Last generated budget proposal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Budgets>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl LedgerState {
    /// Read a state file; a missing file is an empty ledger
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No ledger state yet, starting empty");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)?;
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub struct Ledger {
    state: LedgerState,
    engine: AnomalyEngine,
    allocator: BudgetAllocator,
}

impl Ledger {
    pub fn new(engine: AnomalyEngine, allocator: BudgetAllocator) -> Self {
        Self::from_state(LedgerState::default(), engine, allocator)
    }

    pub fn from_state(state: LedgerState, engine: AnomalyEngine, allocator: BudgetAllocator) -> Self {
        Self {
            state,
            engine,
            allocator,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.state.alerts
    }

    pub fn budgets(&self) -> &Budgets {
        &self.state.budgets
    }

    pub fn suggestion(&self) -> Option<&Budgets> {
        self.state.suggestion.as_ref()
    }

    pub fn contains(&self, transaction_id: &str) -> bool {
        self.state.transactions.iter().any(|t| t.id == transaction_id)
    }

    /// Evaluate a new transaction, then add it and its alerts to the ledger
    ///
    /// Evaluation sees the history as it was before this transaction.
    pub fn record(&mut self, transaction: Transaction) -> Result<Vec<Alert>> {
        validate_transaction(&transaction)?;
        if self.contains(&transaction.id) {
            warn!(transaction = %transaction.id, "Rejecting transaction with a known id");
            return Err(Error::InvalidData(format!(
                "Transaction {} already recorded",
                transaction.id
            )));
        }

        let alerts = self
            .engine
            .evaluate(&transaction, &self.state.transactions, Some(&self.state.budgets));

        info!(
            transaction = %transaction.id,
            category = %transaction.category,
            amount = transaction.amount,
            alerts = alerts.len(),
            "Recorded transaction"
        );

        self.state.transactions.insert(0, transaction);
        self.state.alerts.splice(0..0, alerts.iter().cloned());
        Ok(alerts)
    }

    /// Raise the alert for a message the classifier could not read
    pub fn record_classification_failure(&mut self, now: DateTime<Utc>) -> Alert {
        let alert = Alert::classification_failure(now, self.state.alerts.len());
        info!(alert = %alert.id, "Recorded classification failure");
        self.state.alerts.insert(0, alert.clone());
        alert
    }

    /// Propose a budget from the history and make it the active one
    pub fn generate_budget(&mut self) -> Budgets {
        let budgets = self.allocator.generate(&self.state.transactions);
        self.state.suggestion = Some(budgets.clone());
        self.state.budgets = budgets.clone();
        budgets
    }

    /// Replace the active budget wholesale
    pub fn set_budgets(&mut self, budgets: Budgets) -> Result<()> {
        validate_budgets(&budgets)?;
        info!(categories = budgets.len(), "Active budget replaced");
        self.state.budgets = budgets;
        Ok(())
    }
}
