// Error types for the bouquetly relay

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BouquetError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Retryable upstream failure (429/5xx/network) that exhausted its
    /// retry budget.
    #[error("{message}")]
    TransientApi { status: Option<u16>, message: String },

    /// Non-retryable upstream failure; `status` mirrors the upstream code.
    #[error("{message}")]
    PermanentApi { status: u16, message: String },

    /// Malformed model output. `text` carries the offending payload.
    #[error("Failed to parse model response: {message}")]
    Parse { message: String, text: String },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert BouquetError to HTTP responses for Axum
impl IntoResponse for BouquetError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            BouquetError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "validation_error", self.to_string())
            }
            BouquetError::Timeout(_) => {
                (StatusCode::REQUEST_TIMEOUT, "timeout_error", self.to_string())
            }
            BouquetError::TransientApi { .. } => {
                (StatusCode::BAD_GATEWAY, "api_error", self.to_string())
            }
            BouquetError::PermanentApi { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "api_error",
                self.to_string(),
            ),
            BouquetError::Parse { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "parse_error", self.to_string())
            }
            BouquetError::Config(_) | BouquetError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", self.to_string())
            }
            BouquetError::Http(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "api_error", self.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", self.to_string()),
        };

        let body = json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BouquetError>;
