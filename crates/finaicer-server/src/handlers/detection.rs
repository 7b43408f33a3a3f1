//! Stateless anomaly evaluation

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use finaicer_core::import::{validate_budgets, validate_transaction};
use finaicer_core::models::{Alert, Budgets, Transaction};

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub transaction: Transaction,
    #[serde(default)]
    pub history: Vec<Transaction>,
    /// Without budgets the threshold rule does not run
    pub budgets: Option<Budgets>,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub alerts: Vec<Alert>,
}

/// POST /api/evaluate - Run the detectors over caller-supplied data
///
/// A history entry sharing the transaction's id is ignored, so callers may
/// pass history that already includes the transaction.
pub async fn evaluate_transaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let EvaluateRequest {
        transaction,
        mut history,
        budgets,
    } = request;

    validate_transaction(&transaction).map_err(AppError::from_core)?;
    for tx in &history {
        validate_transaction(tx).map_err(AppError::from_core)?;
    }
    if let Some(budgets) = &budgets {
        validate_budgets(budgets).map_err(AppError::from_core)?;
    }

    history.retain(|tx| tx.id != transaction.id);

    let alerts = state
        .engine
        .evaluate(&transaction, &history, budgets.as_ref());

    Ok(Json(EvaluateResponse { alerts }))
}
