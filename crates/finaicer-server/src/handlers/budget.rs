//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use finaicer_core::import::validate_transaction;
use finaicer_core::models::{Budgets, Transaction};
use finaicer_core::progress::{budget_progress, BudgetReport};

#[derive(Serialize)]
pub struct BudgetResponse {
    /// Active budget
    pub budgets: Budgets,
    /// Last generated proposal, if any
    pub suggestion: Option<Budgets>,
}

/// GET /api/budget - Active budget and last suggestion
pub async fn get_budget(State(state): State<Arc<AppState>>) -> Result<Json<BudgetResponse>, AppError> {
    let ledger = state.ledger()?;
    Ok(Json(BudgetResponse {
        budgets: ledger.budgets().clone(),
        suggestion: ledger.suggestion().cloned(),
    }))
}

/// PUT /api/budget - Replace the active budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Json(budgets): Json<Budgets>,
) -> Result<Json<BudgetResponse>, AppError> {
    let mut ledger = state.ledger()?;
    ledger.set_budgets(budgets).map_err(AppError::from_core)?;

    Ok(Json(BudgetResponse {
        budgets: ledger.budgets().clone(),
        suggestion: ledger.suggestion().cloned(),
    }))
}

/// POST /api/budget/generate - Propose a budget from history and activate it
pub async fn generate_budget(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BudgetResponse>, AppError> {
    let mut ledger = state.ledger()?;
    let budgets = ledger.generate_budget();

    Ok(Json(BudgetResponse {
        suggestion: Some(budgets.clone()),
        budgets,
    }))
}

/// Query parameters for budget progress
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

/// GET /api/budget/progress - Spend vs. goal for a month
pub async fn get_budget_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<BudgetReport>, AppError> {
    let month = match params.month {
        Some(month) => {
            validate_month(&month)?;
            month
        }
        None => state.clock.now().format("%Y-%m").to_string(),
    };

    let ledger = state.ledger()?;
    Ok(Json(budget_progress(
        ledger.transactions(),
        ledger.budgets(),
        &month,
    )))
}

fn validate_month(month: &str) -> Result<(), AppError> {
    let well_formed = month.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(AppError::bad_request("Invalid month format (use YYYY-MM)"))
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub history: Vec<Transaction>,
}

/// POST /api/budget/suggest - Propose a budget for caller-supplied history
///
/// Does not touch the ledger.
pub async fn suggest_budget(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<Budgets>, AppError> {
    for tx in &request.history {
        validate_transaction(tx).map_err(AppError::from_core)?;
    }

    Ok(Json(state.allocator.generate(&request.history)))
}
