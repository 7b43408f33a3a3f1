//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use finaicer_core::{LedgerState, PolicyConfig};

pub async fn cmd_serve(
    policy: PolicyConfig,
    host: &str,
    port: u16,
    state_path: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting FinAicer web server...");
    println!("   Listening: http://{}:{}", host, port);

    let initial_state = match state_path {
        Some(path) => {
            println!("   Ledger: {} (changes are kept in memory)", path.display());
            LedgerState::load(path)
                .with_context(|| format!("Failed to load ledger from {}", path.display()))?
        }
        None => LedgerState::default(),
    };

    println!();
    println!("   Press Ctrl+C to stop");

    let config = finaicer_server::ServerConfig {
        policy,
        allowed_origins: vec![],
        initial_state,
    };

    finaicer_server::serve_with_config(host, port, config).await?;

    Ok(())
}
