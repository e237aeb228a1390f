//! Visualization endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracity_core::service::VISUALIZE_LIMIT;

use crate::dto::{VisualizationResponse, VisualizeQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Records from a collection prepared for charting.
#[utoipa::path(
    get,
    path = "/api/visualize/{collection}",
    params(
        ("collection" = String, Path, description = "Collection name"),
        VisualizeQuery
    ),
    responses(
        (status = 200, description = "Visualization data", body = VisualizationResponse),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "datasets"
)]
pub async fn visualize(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<VisualizeQuery>,
) -> Result<Json<VisualizationResponse>, ApiError> {
    let limit = params.limit.unwrap_or(VISUALIZE_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest(
            "limit must be greater than zero".to_string(),
        ));
    }

    let visualization = state
        .data_service
        .visualize(&collection, limit.min(state.max_filter_limit))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(VisualizationResponse::from(visualization)))
}
