//! Helpers shared by the completion clients: error classification and
//! reply parsing.

use serde_json::Value;
use tracity_core::error::{AppError, LlmErrorDetails, LlmErrorKind};

/// Classify a completion API error from its status code and message.
pub fn classify_llm_error(status_code: u16, message: &str) -> LlmErrorKind {
    match status_code {
        401 | 403 => LlmErrorKind::Authentication,
        429 => {
            if message.contains("insufficient_quota") || message.contains("quota") {
                LlmErrorKind::QuotaExceeded
            } else {
                LlmErrorKind::RateLimit
            }
        }
        500..=599 => LlmErrorKind::ServerError,
        _ => {
            if message.contains("API key") || message.contains("Unauthorized") {
                LlmErrorKind::Authentication
            } else if message.contains("quota") {
                LlmErrorKind::QuotaExceeded
            } else if message.contains("rate") {
                LlmErrorKind::RateLimit
            } else {
                LlmErrorKind::Unknown
            }
        }
    }
}

/// Builds the error for a failed HTTP exchange.
pub fn llm_error(provider: &'static str, status_code: u16, message: String) -> AppError {
    let kind = classify_llm_error(status_code, &message);
    AppError::LlmError(LlmErrorDetails::new(provider, kind, message, status_code))
}

/// Maps a transport failure (no HTTP response) to an application error.
pub fn transport_error(provider: &'static str, e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::LlmError(LlmErrorDetails::new(
            provider,
            LlmErrorKind::NetworkError,
            format!("Cannot connect: {}", e),
            0,
        ))
    } else {
        AppError::ClientError(e.to_string())
    }
}

/// Removes a Markdown code fence wrapped around a reply, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a completion reply as JSON.
pub fn parse_json_reply(text: &str) -> Result<Value, AppError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(AppError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}
