//! Alert handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use finaicer_core::models::{Alert, AlertType};

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Only `anomaly` or only `budget` alerts
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
}

/// GET /api/alerts - List raised alerts, newest first
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let ledger = state.ledger()?;
    let alerts = ledger
        .alerts()
        .iter()
        .filter(|alert| params.alert_type.map_or(true, |t| alert.alert_type == t))
        .cloned()
        .collect();

    Ok(Json(alerts))
}
