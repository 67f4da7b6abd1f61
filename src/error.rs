use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid Ethereum address format")]
    InvalidAddressFormat,

    #[error("{label} timed out after {after_ms}ms")]
    Timeout { label: String, after_ms: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Blockchain RPC error: {0}")]
    Rpc(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing credentials for {0}")]
    MissingCredentials(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Timeouts and 429/5xx style upstream replies are expected noise from
    /// public endpoints and are logged at debug rather than warn.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Timeout { .. } => true,
            AppError::Network(message) | AppError::ExternalApi(message) => {
                let lower = message.to_ascii_lowercase();
                lower.contains("429")
                    || lower.contains("too many requests")
                    || lower.contains("rate limit")
                    || lower.contains("502")
                    || lower.contains("503")
                    || lower.contains("504")
                    || lower.contains("connection reset")
            }
            _ => false,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidAddressFormat => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS",
                self.to_string(),
            ),
            AppError::BadRequest(ref msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
            ),
            AppError::Timeout { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                self.to_string(),
            ),
            AppError::Network(_) | AppError::Rpc(_) | AppError::ExternalApi(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                self.to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
