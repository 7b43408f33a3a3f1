//! Report handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use finaicer_core::stats::{profile_stats, ProfileStats};

/// GET /api/stats - Savings, categories and activity over the ledger
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<ProfileStats>, AppError> {
    let ledger = state.ledger()?;
    Ok(Json(profile_stats(ledger.transactions(), state.clock.now())))
}
