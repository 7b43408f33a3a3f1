//! FinAicer CLI - Anomaly detection and budget allocation
//!
//! Usage:
//!   finaicer evaluate --history h.json --transaction tx.json   Check one transaction
//!   finaicer budget --history h.json                           Propose a budget
//!   finaicer ingest --state ledger.json --transaction tx.json  Record and alert
//!   finaicer serve --port 3000                                 Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use finaicer_core::PolicyConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let policy = PolicyConfig::load(cli.policy.as_deref()).context("Failed to load policy")?;

    match cli.command {
        Commands::Evaluate {
            history,
            transaction,
            budgets,
        } => commands::cmd_evaluate(&policy, &history, &transaction, budgets.as_deref(), cli.json),
        Commands::Budget { history, out } => {
            commands::cmd_budget(&policy, &history, out.as_deref(), cli.json)
        }
        Commands::Progress {
            history,
            budgets,
            month,
        } => commands::cmd_progress(&history, &budgets, month.as_deref(), cli.json),
        Commands::Stats { history } => commands::cmd_stats(&history, cli.json),
        Commands::Ingest {
            state,
            transaction,
            failed,
        } => {
            if failed {
                commands::cmd_ingest_failure(&policy, &state, cli.json)
            } else {
                let transaction =
                    transaction.context("--transaction is required unless --failed is set")?;
                commands::cmd_ingest(&policy, &state, &transaction, cli.json)
            }
        }
        Commands::Policy => commands::cmd_policy(&policy),
        Commands::Serve { port, host, state } => {
            commands::cmd_serve(policy, &host, port, state.as_deref()).await
        }
    }
}
