//! Budget command implementation

use std::path::Path;

use anyhow::{Context, Result};
use finaicer_core::import::load_history;
use finaicer_core::{format_amount, Budgets, PolicyConfig};

use super::{build_allocator, truncate};

/// Propose a budget and optionally save it as JSON
pub fn propose_budget(
    policy: &PolicyConfig,
    history_path: &Path,
    out: Option<&Path>,
) -> Result<Budgets> {
    let history = load_history(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;

    let budgets = build_allocator(policy).generate(&history);

    if let Some(out) = out {
        std::fs::write(out, serde_json::to_string_pretty(&budgets)?)
            .with_context(|| format!("Failed to write budget to {}", out.display()))?;
    }

    Ok(budgets)
}

pub fn cmd_budget(
    policy: &PolicyConfig,
    history_path: &Path,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    let budgets = propose_budget(policy, history_path, out)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&budgets)?);
        return Ok(());
    }

    if budgets.is_empty() {
        println!("No transactions yet; nothing to budget.");
        return Ok(());
    }

    println!();
    println!("💰 Proposed Monthly Budget");
    println!("   ─────────────────────────────────────────────");
    for (category, goal) in &budgets {
        println!("   {:25} │ {:>15}", truncate(category, 25), format_amount(*goal));
    }
    println!("   ─────────────────────────────────────────────");
    println!(
        "   {:25} │ {:>15}",
        "Total",
        format_amount(budgets.values().sum())
    );

    if let Some(out) = out {
        println!();
        println!("   Saved to {}", out.display());
    }

    Ok(())
}
