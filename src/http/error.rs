//! Client-facing request errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures the handler reports instead of an output envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `url` query parameter absent or empty.
    #[error("Missing url parameter")]
    MissingParameter,

    /// Path segment is not one of get/json/raw/info.
    #[error("Invalid format")]
    UnsupportedFormat(String),

    /// Rendering failed after the fetch.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Internal(e.to_string())
    }
}

impl From<axum::http::Error> for RelayError {
    fn from(e: axum::http::Error) -> Self {
        RelayError::Internal(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingParameter => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing url parameter" })),
            )
                .into_response(),
            RelayError::UnsupportedFormat(format) => {
                tracing::debug!(format = %format, "Rejected unsupported format");
                (StatusCode::BAD_REQUEST, "Invalid format").into_response()
            }
            RelayError::Internal(message) => {
                tracing::error!(error = %message, "Failed to render response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error", "message": message })),
                )
                    .into_response()
            }
        }
    }
}
