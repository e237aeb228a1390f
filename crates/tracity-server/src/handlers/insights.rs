//! Dataset insights endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::dto::DatasetInsightsResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Comprehensive analysis of a dataset sample.
#[utoipa::path(
    get,
    path = "/api/insights/{collection}",
    params(
        ("collection" = String, Path, description = "Collection name")
    ),
    responses(
        (status = 200, description = "Dataset insights", body = DatasetInsightsResponse),
        (status = 404, description = "No data found in collection"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "insights"
)]
pub async fn get_insights(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<DatasetInsightsResponse>, ApiError> {
    let insights = state
        .data_service
        .insights(&collection)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DatasetInsightsResponse::from(insights)))
}
