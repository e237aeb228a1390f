//! Service banner.

use axum::Json;

use crate::dto::RootResponse;

/// Service banner.
#[utoipa::path(
    get,
    path = "/api/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse),
    ),
    tag = "system"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Tracity API - Your AI Data Companion".to_string(),
    })
}
