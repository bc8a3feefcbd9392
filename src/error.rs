// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    clients::{ai::AiError, store::StoreError},
    services::upload::UploadError,
};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("{0}")]
    InternalServerError(String),

    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 400 / 413, rejected upload
    #[error(transparent)]
    Upload(#[from] UploadError),

    // 413 Payload Too Large (request body over the transport limit)
    #[error("{0}")]
    PayloadTooLarge(String),

    // 502, the model answered with JSON of the wrong shape
    #[error("AI response validation error: {0}")]
    GenerationInvalid(String),

    // 502 / 504
    #[error(transparent)]
    Ai(#[from] AiError),

    // 401 Unauthorized
    #[error("{0}")]
    AuthError(String),

    // 403 Forbidden (authenticated, but not the owner)
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 500, document store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Presentation bucket for an error, derived from its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    File,
    Ai,
    Storage,
    Payload,
    General,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Upload(_) => ErrorCategory::File,
            AppError::GenerationInvalid(_) | AppError::Ai(_) => ErrorCategory::Ai,
            AppError::Store(_) => ErrorCategory::Storage,
            AppError::PayloadTooLarge(_) => ErrorCategory::Payload,
            AppError::InternalServerError(_)
            | AppError::BadRequest(_)
            | AppError::AuthError(_)
            | AppError::Forbidden(_)
            | AppError::NotFound(_) => ErrorCategory::General,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(UploadError::TooLarge { .. }) | AppError::PayloadTooLarge(_) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationInvalid(_) => StatusCode::BAD_GATEWAY,
            AppError::Ai(AiError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show to the caller.
    fn public_message(&self) -> String {
        match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                "A storage error occurred. Please try again.".to_string()
            }
            AppError::Ai(AiError::Timeout) => {
                "AI processing timed out, possibly due to a large/complex document.".to_string()
            }
            AppError::Ai(e) => format!("An error occurred with the AI service. ({})", e),
            other => other.to_string(),
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.public_message(),
            "category": self.category(),
        }));

        (status, body).into_response()
    }
}
