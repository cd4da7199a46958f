use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::controller::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
    uptime_seconds: i64,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    store: ComponentHealth,
    simulation: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn up(started: Instant, detail: Option<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            detail,
        }
    }

    fn down(error: impl ToString) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            detail: Some(error.to_string()),
        }
    }

    fn is_up(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Round-trip a cheap query through the alert repository
async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    match state.repos.alerts.unread_count().await {
        Ok(_) => ComponentHealth::up(start, None),
        Err(e) => ComponentHealth::down(e),
    }
}

async fn check_simulation(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let snapshot = state.simulation.snapshot().await;
    let detail = if snapshot.is_running {
        format!("running at {}x", snapshot.speed_multiplier)
    } else {
        "stopped".to_string()
    };
    ComponentHealth::up(start, Some(detail))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = check_store(&state).await;
    let simulation = check_simulation(&state).await;
    let all_healthy = store.is_up() && simulation.is_up();

    let now = Utc::now();
    let response = HealthResponse {
        status: if all_healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        timestamp: now,
        uptime_seconds: (now - state.started_at).num_seconds(),
        checks: HealthChecks { store, simulation },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if check_store(&state).await.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
