use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::response::{success, ApiResponse};
use crate::controller::AppState;
use crate::domain::Alert;

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// GET /alerts
pub async fn list_alerts(
    State(st): State<AppState>,
    Query(q): Query<AlertsQuery>,
) -> Result<ApiResponse<Vec<Alert>>, ApiError> {
    let alerts = st.repos.alerts.list_alerts(q.limit).await?;
    let unread = st.repos.alerts.unread_count().await?;
    let count = alerts.len();
    Ok(success(alerts).with_count(count).with_unread(unread))
}

/// POST /alerts/:id/read
pub async fn mark_read(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Alert>, ApiError> {
    Ok(success(st.repos.alerts.mark_read(id).await?))
}

#[derive(Debug, Serialize)]
pub struct MarkAllRead {
    pub updated: usize,
}

/// POST /alerts/read-all
pub async fn mark_all_read(State(st): State<AppState>) -> Result<ApiResponse<MarkAllRead>, ApiError> {
    let updated = st.repos.alerts.mark_all_read().await?;
    Ok(success(MarkAllRead { updated }))
}

/// DELETE /alerts/:id
pub async fn delete_alert(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    st.repos.alerts.delete_alert(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
