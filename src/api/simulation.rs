use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::response::{success, ApiResponse};
use crate::controller::AppState;
use crate::domain::{
    DeviceStatus, DeviceTemplate, Recurrence, ScheduledTask, SimulatedDevice, TaskAction,
};
use crate::simulation::{device_library, SimulationState};

/// GET /simulation
pub async fn get_state(State(st): State<AppState>) -> ApiResponse<SimulationState> {
    success(st.simulation.snapshot().await)
}

/// POST /simulation/start
pub async fn start(State(st): State<AppState>) -> ApiResponse<SimulationState> {
    success(st.simulation.start().await)
}

/// POST /simulation/stop
pub async fn stop(State(st): State<AppState>) -> ApiResponse<SimulationState> {
    success(st.simulation.stop().await)
}

/// POST /simulation/reset
pub async fn reset(State(st): State<AppState>) -> ApiResponse<SimulationState> {
    success(st.simulation.reset(Utc::now()).await)
}

#[derive(Debug, Deserialize)]
pub struct SpeedRequest {
    pub multiplier: f64,
}

/// POST /simulation/speed
pub async fn set_speed(
    State(st): State<AppState>,
    Json(req): Json<SpeedRequest>,
) -> Result<ApiResponse<SimulationState>, ApiError> {
    Ok(success(st.simulation.set_speed(req.multiplier).await?))
}

/// GET /devices/library
pub async fn library() -> ApiResponse<Vec<DeviceTemplate>> {
    let templates = device_library();
    let count = templates.len();
    success(templates).with_count(count)
}

#[derive(Debug, Deserialize)]
pub struct AddDeviceRequest {
    pub template_id: String,
}

/// POST /simulation/devices
pub async fn add_device(
    State(st): State<AppState>,
    Json(req): Json<AddDeviceRequest>,
) -> Result<(StatusCode, ApiResponse<SimulatedDevice>), ApiError> {
    let device = st.simulation.add_device(&req.template_id).await?;
    Ok((StatusCode::CREATED, success(device)))
}

/// DELETE /simulation/devices/:id
pub async fn remove_device(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    st.simulation.remove_device(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: DeviceStatus,
}

/// POST /simulation/devices/:id/status
pub async fn set_device_status(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<ApiResponse<SimulatedDevice>, ApiError> {
    Ok(success(st.simulation.set_device_status(id, req.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleTaskRequest {
    pub action: TaskAction,
    pub scheduled_time: DateTime<Utc>,
    pub value: Option<f64>,
    pub recurrence: Option<Recurrence>,
}

/// POST /simulation/devices/:id/tasks
pub async fn schedule_task(
    State(st): State<AppState>,
    Path(device_id): Path<Uuid>,
    Json(req): Json<ScheduleTaskRequest>,
) -> Result<(StatusCode, ApiResponse<ScheduledTask>), ApiError> {
    let task = st
        .simulation
        .schedule_task(
            device_id,
            req.action,
            req.scheduled_time,
            req.value,
            req.recurrence,
        )
        .await?;
    Ok((StatusCode::CREATED, success(task)))
}

/// DELETE /simulation/devices/:id/tasks/:task_id
pub async fn cancel_task(
    State(st): State<AppState>,
    Path((device_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    st.simulation.cancel_task(device_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
