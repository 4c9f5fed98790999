//! ApiError to HTTP response mapping.

use crate::error::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageUploadFailed(_) => StatusCode::BAD_GATEWAY,
            err if err.is_provider_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::StorageUploadFailed(details) => json!({
                "success": false,
                "error": "Failed to upload image",
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
