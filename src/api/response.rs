use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `{success: true, data, timestamp, metadata?}` envelope for handler output.
/// Failures never use it; they go through `ApiError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Unread alerts at the time of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<usize>,
    /// Chart points were replaced by the canned profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fallback: Option<bool>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    fn metadata_mut(&mut self) -> &mut ResponseMetadata {
        self.metadata.get_or_insert_with(ResponseMetadata::default)
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.metadata_mut().total_count = Some(count);
        self
    }

    pub fn with_unread(mut self, unread: usize) -> Self {
        self.metadata_mut().unread_count = Some(unread);
        self
    }

    pub fn with_fallback(mut self, is_fallback: bool) -> Self {
        self.metadata_mut().is_fallback = Some(is_fallback);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::new(data)
}
