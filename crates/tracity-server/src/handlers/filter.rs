//! Filter endpoints.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::dto::{FilterOptionsResponse, FilterRequestBody, FilterResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Filter a collection by state, year and category.
///
/// Returns the matching page of records, the applied query and a chart
/// recommendation, plus an insight when `include_insights` is set.
#[utoipa::path(
    post,
    path = "/api/filter",
    request_body = FilterRequestBody,
    responses(
        (status = 200, description = "Filtered records", body = FilterResponse),
        (status = 400, description = "Invalid filter request"),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "datasets"
)]
pub async fn filter_data(
    State(state): State<AppState>,
    Json(body): Json<FilterRequestBody>,
) -> Result<Json<FilterResponse>, ApiError> {
    let include_insights = body.include_insights;
    let request = body.into_request(state.max_filter_limit)?;

    let outcome = state
        .data_service
        .filter(&request, include_insights)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(FilterResponse::from(outcome)))
}

/// Distinct filter values for a collection.
#[utoipa::path(
    get,
    path = "/api/filter/{collection}/options",
    params(
        ("collection" = String, Path, description = "Collection name")
    ),
    responses(
        (status = 200, description = "Available filter values", body = FilterOptionsResponse),
        (status = 404, description = "Collection not found"),
    ),
    tag = "datasets"
)]
pub async fn filter_options(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<FilterOptionsResponse>, ApiError> {
    let options = state
        .data_service
        .filter_options(&collection)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(FilterOptionsResponse::from(options)))
}
