//! Statistics endpoint.

use axum::{Json, extract::State};
use tracity_core::PlatformStats;

use crate::dto::StatsResponse;
use crate::state::AppState;

/// Get dashboard statistics.
///
/// Falls back to fixed counters when the document store is unavailable.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Platform statistics", body = StatsResponse),
    ),
    tag = "system"
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state
        .data_service
        .platform_stats()
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Error getting stats: {}", e);
            PlatformStats::unavailable()
        });

    Json(StatsResponse::from(stats))
}
