use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::response::{success, ApiResponse};
use crate::controller::AppState;
use crate::series::{chart_series_or_fallback, ChartSeries, ReconciledSeries};

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub user_id: Option<Uuid>,
}

/// GET /energy/series
pub async fn get_series(
    State(st): State<AppState>,
    Query(q): Query<SeriesQuery>,
) -> Result<ApiResponse<ReconciledSeries>, ApiError> {
    let series = st.simulation.series(q.user_id).await?;
    let count = series.points.len();
    Ok(success(series).with_count(count))
}

/// GET /energy/chart
///
/// Same series as `/energy/series`, replaced by the canned profile when it
/// would not render.
pub async fn get_chart(
    State(st): State<AppState>,
    Query(q): Query<SeriesQuery>,
) -> Result<ApiResponse<ChartSeries>, ApiError> {
    let series = st.simulation.series(q.user_id).await?;
    let anchor = st.simulation.series_anchor().await;
    let chart = chart_series_or_fallback(series.points, st.cfg.reconciliation.min_points, anchor);
    let fallback = chart.is_fallback;
    Ok(success(chart).with_fallback(fallback))
}
