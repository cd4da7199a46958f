use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::response::{success, ApiResponse};
use crate::controller::AppState;
use crate::functions::{BackfillRequest, BackfillResponse, EnergySimulationResponse, GamificationOutcome};

/// POST /functions/energy-simulation
pub async fn energy_simulation(
    State(st): State<AppState>,
) -> Result<Json<EnergySimulationResponse>, ApiError> {
    let response = st.simulation.simulate_once(Utc::now()).await?;
    Ok(Json(response))
}

/// POST /functions/backfill-historical-data
pub async fn backfill_historical_data(
    State(st): State<AppState>,
    payload: Result<Json<BackfillRequest>, JsonRejection>,
) -> Result<Json<BackfillResponse>, ApiError> {
    let Json(req) = payload?;
    let records_created = st.simulation.backfill(&req, Utc::now()).await?;
    Ok(Json(BackfillResponse {
        success: true,
        records_created,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GamificationRequest {
    pub user_id: Uuid,
}

/// POST /functions/check-gamification
pub async fn check_gamification(
    State(st): State<AppState>,
    payload: Result<Json<GamificationRequest>, JsonRejection>,
) -> Result<ApiResponse<GamificationOutcome>, ApiError> {
    let Json(req) = payload?;
    let outcome = st
        .simulation
        .check_gamification(req.user_id, Utc::now())
        .await?;
    let awarded = outcome.new_achievements.len();
    Ok(success(outcome).with_count(awarded))
}
