//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinAicer - Spot unusual spending and plan your monthly budget
#[derive(Parser)]
#[command(name = "finaicer")]
#[command(about = "Anomaly detection and budget allocation for classified transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Policy file (TOML) with detection thresholds and budget settings
    ///
    /// Defaults to the user's data directory override if present,
    /// otherwise the built-in policy.
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one transaction against a history
    Evaluate {
        /// History file (JSON array or CSV of classified transactions)
        #[arg(long)]
        history: PathBuf,

        /// Transaction to evaluate (JSON object)
        #[arg(short, long)]
        transaction: PathBuf,

        /// Active budget (JSON object of category → monthly goal)
        #[arg(short, long)]
        budgets: Option<PathBuf>,
    },

    /// Propose a monthly budget from a history
    Budget {
        /// History file (JSON array or CSV of classified transactions)
        #[arg(long)]
        history: PathBuf,

        /// Write the proposed budget to this file (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show spend vs. goal for a month
    Progress {
        /// History file (JSON array or CSV of classified transactions)
        #[arg(long)]
        history: PathBuf,

        /// Budget file (JSON object of category → monthly goal)
        #[arg(short, long)]
        budgets: PathBuf,

        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show savings and activity statistics
    Stats {
        /// History file (JSON array or CSV of classified transactions)
        #[arg(long)]
        history: PathBuf,
    },

    /// Record a transaction in a ledger state file and show its alerts
    Ingest {
        /// Ledger state file (created if missing)
        #[arg(short, long)]
        state: PathBuf,

        /// Classified transaction to record (JSON object)
        #[arg(short, long, required_unless_present = "failed", conflicts_with = "failed")]
        transaction: Option<PathBuf>,

        /// Record that the classifier failed to read the last message
        #[arg(long)]
        failed: bool,
    },

    /// Print the effective policy as TOML
    Policy,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Ledger state file to start from
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
}
