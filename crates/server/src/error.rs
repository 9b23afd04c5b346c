use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Domain failures, all surfaced to callers through the JSON envelope
/// (`{"success": false, "message": ...}`) rather than transport status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Message not found")]
    NotFound,
    #[error("Not allowed")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(ref e) = self {
            tracing::error!(error = %e, "persistent store failure");
        }
        Json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }))
        .into_response()
    }
}
