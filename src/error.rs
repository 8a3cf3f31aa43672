use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Layer fetch failed: {0}")]
    LayerFetch(String),

    #[error("Label placement failed: {0}")]
    LabelPlacement(String),

    #[error("Failed to generate PDF: {0}")]
    Render(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::PayloadTooLarge(ref e) => (StatusCode::PAYLOAD_TOO_LARGE, e.clone()),
            AppError::LayerFetch(ref e) => {
                // Layer failures are absorbed by the pipeline; reaching here is unusual
                tracing::warn!("Layer fetch error escaped the pipeline: {}", e);
                (StatusCode::BAD_GATEWAY, "Map data provider error".to_string())
            }
            AppError::LabelPlacement(ref e) => {
                tracing::warn!("Label placement error escaped the pipeline: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Label placement error".to_string(),
                )
            }
            AppError::Render(ref e) => {
                tracing::error!("Render error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to generate PDF: {}", e),
                )
            }
            AppError::Timeout(ref e) => {
                tracing::warn!("Request timed out: {}", e);
                (StatusCode::GATEWAY_TIMEOUT, e.clone())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
