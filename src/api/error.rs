use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strum::AsRefStr;
use thiserror::Error;

use crate::functions::FunctionError;
use crate::repo::StoreError;
use crate::simulation::SimulationError;

/// Handler failure. The variant name doubles as the `error` field of the
/// JSON body.
#[derive(Debug, Error, AsRefStr)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("internal error: {0}")]
    #[strum(serialize = "InternalServerError")]
    InternalError(String),

    #[error("store unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("store failure: {0}")]
    StoreError(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError(_) | Self::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors echo their message; server-side details stay in the log.
    fn public_message(&self) -> String {
        match self {
            Self::InternalError(_) | Self::StoreError(_) => {
                tracing::error!(error = %self, "request failed");
                "internal error".to_string()
            }
            Self::ServiceUnavailable(_) => {
                tracing::warn!(error = %self, "store unavailable");
                "store temporarily unavailable".to_string()
            }
            _ => {
                tracing::debug!(error = %self, "rejected request");
                self.to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.as_ref(),
            message: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self::NotFound(error.to_string()),
            StoreError::InvalidRecord(msg) => Self::ValidationError(msg),
            StoreError::Unavailable(msg) => Self::ServiceUnavailable(msg),
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(error: SimulationError) -> Self {
        match error {
            SimulationError::DeviceNotFound(_) | SimulationError::TaskNotFound(_) => {
                Self::NotFound(error.to_string())
            }
            SimulationError::UnknownTemplate(_)
            | SimulationError::InvalidTask(_)
            | SimulationError::InvalidSpeed { .. } => Self::BadRequest(error.to_string()),
        }
    }
}

impl From<FunctionError> for ApiError {
    fn from(error: FunctionError) -> Self {
        match error {
            FunctionError::Store(e) => e.into(),
            FunctionError::Validation(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self::InternalError(format!("{error:#}"))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}
