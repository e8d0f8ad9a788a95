use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use service::errors::ServiceError;

/// Service-layer failure carried to the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Validation(_) | ServiceError::Model(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = self.0.to_string();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %msg, "request failed on storage");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
