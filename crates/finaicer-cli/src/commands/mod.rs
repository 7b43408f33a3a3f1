//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (engine construction, alert printing)
//! - `evaluate` - One-off evaluation of a transaction against a history
//! - `budget` - Budget proposal
//! - `reports` - Budget progress and statistics
//! - `ingest` - Recording into a ledger state file
//! - `policy` - Effective policy output
//! - `serve` - Web server command

pub mod budget;
pub mod core;
pub mod evaluate;
pub mod ingest;
pub mod policy;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use budget::*;
pub use core::*;
pub use evaluate::*;
pub use ingest::*;
pub use policy::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
