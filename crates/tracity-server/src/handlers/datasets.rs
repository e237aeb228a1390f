//! Dataset listing endpoint.

use axum::{Json, extract::State};

use crate::dto::DatasetResponse;
use crate::state::AppState;

/// List available datasets.
///
/// Returns an empty list when the document store is unavailable.
#[utoipa::path(
    get,
    path = "/api/datasets",
    responses(
        (status = 200, description = "Available datasets", body = Vec<DatasetResponse>),
    ),
    tag = "datasets"
)]
pub async fn list_datasets(State(state): State<AppState>) -> Json<Vec<DatasetResponse>> {
    match state.data_service.list_datasets().await {
        Ok(datasets) => Json(datasets.into_iter().map(DatasetResponse::from).collect()),
        Err(e) => {
            tracing::error!("Error getting datasets: {}", e);
            Json(Vec::new())
        }
    }
}
