//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use finaicer_core::import::transaction_from_value;
use finaicer_core::models::{Alert, Transaction};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    /// Newest first
    pub transactions: Vec<Transaction>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// GET /api/transactions - List recorded transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let ledger = state.ledger()?;
    let transactions = ledger
        .transactions()
        .iter()
        .skip(params.offset)
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(TransactionResponse {
        transactions,
        total: ledger.transactions().len(),
        limit,
        offset: params.offset,
    }))
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub transaction: Transaction,
    /// Alerts raised by this transaction, in rule order
    pub alerts: Vec<Alert>,
}

/// POST /api/transactions - Record a classified transaction
///
/// Accepts the classifier's record (`fecha`, `entidad`, `monto`, ...) or a full
/// transaction with an `id`. The transaction is evaluated against the history
/// recorded so far, then added to it.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RecordResponse>), AppError> {
    let received_at = state.clock.now().with_timezone(&Utc);

    let mut ledger = state.ledger()?;
    let transaction = transaction_from_value(body, received_at, ledger.transactions().len())
        .map_err(AppError::from_core)?;

    if ledger.contains(&transaction.id) {
        return Err(AppError::conflict(&format!(
            "Transaction {} already recorded",
            transaction.id
        )));
    }

    let alerts = ledger
        .record(transaction.clone())
        .map_err(AppError::from_core)?;

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            transaction,
            alerts,
        }),
    ))
}

/// POST /api/transactions/failure - Report a message the classifier could not read
pub async fn record_classification_failure(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Alert>), AppError> {
    let now = state.clock.now().with_timezone(&Utc);
    let alert = state.ledger()?.record_classification_failure(now);
    Ok((StatusCode::CREATED, Json(alert)))
}
