use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use tracity_core::error::{AppError, LlmErrorKind};

/// API error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// JSON error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
            ApiError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                "Rate limit exceeded. Please wait and try again.".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::CollectionNotFound(_) => ApiError::NotFound("Collection not found".to_string()),
            AppError::NoData(_) => ApiError::NotFound("No data found in collection".to_string()),
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                ApiError::Internal("Database error".to_string())
            }
            AppError::LlmError(details) => match details.kind {
                LlmErrorKind::RateLimit => ApiError::RateLimitExceeded,
                LlmErrorKind::Authentication | LlmErrorKind::QuotaExceeded => {
                    ApiError::ServiceUnavailable("Completion service unavailable".to_string())
                }
                _ => ApiError::Internal("Completion service error".to_string()),
            },
            AppError::ConfigError(msg) => {
                ApiError::Internal(format!("Configuration error: {}", msg))
            }
            AppError::EmptyResponse => ApiError::NotFound("No data available".to_string()),
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::ClientError(_) => {
                ApiError::ServiceUnavailable("External service unavailable".to_string())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
