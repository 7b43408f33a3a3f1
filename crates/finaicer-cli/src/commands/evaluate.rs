//! Evaluate command implementation

use std::path::Path;

use anyhow::{Context, Result};
use finaicer_core::import::{load_budgets, load_history, load_transaction};
use finaicer_core::models::Alert;
use finaicer_core::{AnomalyEngine, PolicyConfig};

use super::{build_engine, print_alerts};

/// Load the files and run the detectors
///
/// A history entry with the transaction's own id is dropped before evaluating.
pub fn evaluate_files(
    engine: &AnomalyEngine,
    history_path: &Path,
    transaction_path: &Path,
    budgets_path: Option<&Path>,
) -> Result<Vec<Alert>> {
    let mut history = load_history(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;
    let transaction = load_transaction(transaction_path).with_context(|| {
        format!(
            "Failed to load transaction from {}",
            transaction_path.display()
        )
    })?;
    let budgets = budgets_path
        .map(load_budgets)
        .transpose()
        .context("Failed to load budgets")?;

    history.retain(|tx| tx.id != transaction.id);

    Ok(engine.evaluate(&transaction, &history, budgets.as_ref()))
}

pub fn cmd_evaluate(
    policy: &PolicyConfig,
    history_path: &Path,
    transaction_path: &Path,
    budgets_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let alerts = evaluate_files(
        &build_engine(policy),
        history_path,
        transaction_path,
        budgets_path,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
    } else {
        print_alerts(&alerts);
    }

    Ok(())
}
