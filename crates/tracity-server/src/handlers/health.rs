//! Health check endpoint.

use axum::{Json, extract::State};

use crate::dto::{HealthResponse, ServiceStatus};
use crate::state::AppState;

/// Health check endpoint.
///
/// Returns the server version and document store connectivity. An
/// unreachable store reports "degraded" rather than failing the request.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server health", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.repo.health_check().await {
        Ok(()) => ServiceStatus {
            healthy: true,
            message: None,
        },
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ServiceStatus {
                healthy: false,
                message: Some("Database unreachable".to_string()),
            }
        }
    };

    let status = if database.healthy { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        completion_provider: state.completion_provider().to_string(),
    })
}
