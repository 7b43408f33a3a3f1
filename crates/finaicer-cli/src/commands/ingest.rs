//! Ingest command implementations
//!
//! Each invocation loads the ledger state file, records one event and saves
//! the state back.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use finaicer_core::import::load_transaction;
use finaicer_core::models::Alert;
use finaicer_core::{AnomalyEngine, BudgetAllocator, Ledger, LedgerState, PolicyConfig};
use tracing::debug;

use super::{build_allocator, build_engine, print_alerts};

fn open_ledger(state_path: &Path, engine: AnomalyEngine, allocator: BudgetAllocator) -> Result<Ledger> {
    let state = LedgerState::load(state_path)
        .with_context(|| format!("Failed to load ledger from {}", state_path.display()))?;
    debug!(
        path = %state_path.display(),
        transactions = state.transactions.len(),
        alerts = state.alerts.len(),
        "Opened ledger"
    );
    Ok(Ledger::from_state(state, engine, allocator))
}

fn save_ledger(ledger: &Ledger, state_path: &Path) -> Result<()> {
    ledger
        .state()
        .save(state_path)
        .with_context(|| format!("Failed to save ledger to {}", state_path.display()))
}

/// Record a transaction file into the ledger state file
pub fn ingest_transaction(
    engine: AnomalyEngine,
    allocator: BudgetAllocator,
    state_path: &Path,
    transaction_path: &Path,
) -> Result<Vec<Alert>> {
    let mut ledger = open_ledger(state_path, engine, allocator)?;
    let transaction = load_transaction(transaction_path).with_context(|| {
        format!(
            "Failed to load transaction from {}",
            transaction_path.display()
        )
    })?;

    let alerts = ledger.record(transaction)?;
    save_ledger(&ledger, state_path)?;
    Ok(alerts)
}

pub fn cmd_ingest(
    policy: &PolicyConfig,
    state_path: &Path,
    transaction_path: &Path,
    json: bool,
) -> Result<()> {
    let alerts = ingest_transaction(
        build_engine(policy),
        build_allocator(policy),
        state_path,
        transaction_path,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
    } else {
        println!("📥 Transaction recorded in {}", state_path.display());
        print_alerts(&alerts);
    }

    Ok(())
}

/// Record a classification failure alert in the ledger state file
pub fn ingest_failure(policy: &PolicyConfig, state_path: &Path) -> Result<Alert> {
    let mut ledger = open_ledger(state_path, build_engine(policy), build_allocator(policy))?;
    let alert = ledger.record_classification_failure(Utc::now());
    save_ledger(&ledger, state_path)?;
    Ok(alert)
}

pub fn cmd_ingest_failure(policy: &PolicyConfig, state_path: &Path, json: bool) -> Result<()> {
    let alert = ingest_failure(policy, state_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alert)?);
    } else {
        println!("⚠️  {}", alert.message);
    }

    Ok(())
}
