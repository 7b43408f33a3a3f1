//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod alerts;
pub mod budget;
pub mod detection;
pub mod reports;
pub mod status;
pub mod transactions;

// Re-export all handlers for use in router
pub use alerts::*;
pub use budget::*;
pub use detection::*;
pub use reports::*;
pub use status::*;
pub use transactions::*;
