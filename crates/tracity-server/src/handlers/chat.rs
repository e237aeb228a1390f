//! Chat endpoint.

use axum::{Json, extract::State};
use tracity_core::ChatOutcome;

use crate::dto::{ChatRequest, ChatResponse, MAX_CHAT_QUERY_LENGTH};
use crate::error::ApiError;
use crate::state::AppState;

/// Ask a natural-language question about the datasets.
///
/// Answers from the named dataset when it exists, otherwise from the first
/// few collections. Store failures produce an apologetic answer, not an error.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Chat answer", body = ChatResponse),
        (status = 400, description = "Invalid query"),
    ),
    tag = "insights"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }

    if request.query.len() > MAX_CHAT_QUERY_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Query exceeds maximum length of {} characters",
            MAX_CHAT_QUERY_LENGTH
        )));
    }

    let outcome = state
        .data_service
        .chat(&request.query, request.dataset.as_deref())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Chat error: {}", e);
            ChatOutcome::apology(&request.query)
        });

    Ok(Json(ChatResponse::from(outcome)))
}
