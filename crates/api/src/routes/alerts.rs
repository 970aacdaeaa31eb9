//! Alert Routes

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::SharedState;
use alerting::Severity;
use storage::Alert;

/// Query parameters for the alert list endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by severity
    pub severity: Option<String>,
    /// Records to skip
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Response for alert list endpoints
#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub data: Vec<Alert>,
    pub count: usize,
}

/// Response for alert deletion
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

const MAX_LIMIT: u32 = 500;

/// Get all alerts, newest first, optionally filtered by severity
pub async fn list_alerts(
    State(state): State<SharedState>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<AlertListResponse>, ApiError> {
    let severity = params
        .severity
        .as_deref()
        .map(|s| s.parse::<Severity>())
        .transpose()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let state = state.read().await;
    let limit = params.limit.min(MAX_LIMIT);
    let data = state
        .repository
        .get_alerts(severity, params.skip, limit)
        .await?;

    Ok(Json(AlertListResponse {
        count: data.len(),
        data,
    }))
}

/// Get active alerts, newest first
///
/// A pure read: an empty store yields an empty list, no seeding.
pub async fn active_alerts(
    State(state): State<SharedState>,
) -> Result<Json<AlertListResponse>, ApiError> {
    let state = state.read().await;
    let data = state.repository.get_active_alerts().await?;

    Ok(Json(AlertListResponse {
        count: data.len(),
        data,
    }))
}

/// Mark an alert as read (idempotent one-way deactivation)
pub async fn mark_read(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Alert>, ApiError> {
    let state = state.read().await;
    let alert = state.repository.mark_alert_read(id).await?;
    Ok(Json(alert))
}

/// Hard-delete an alert
pub async fn delete_alert(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let state = state.read().await;
    state.repository.delete_alert(id).await?;

    Ok(Json(DeleteResponse {
        message: "Alert deleted successfully".to_string(),
    }))
}
