//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::dto::{
    ChartRecommendationDto, ChatRequest, ChatResponse, ChatResultDto, DatasetInsightsResponse,
    DatasetResponse, FilterOptionsResponse, FilterRequestBody, FilterResponse, HealthResponse,
    InsightDto, RootResponse, ServiceStatus, StatsResponse, VisualizationResponse, VisualizeQuery,
};
use crate::error::ErrorResponse;
use crate::handlers::{chat, datasets, filter, health, insights, root, stats, visualize};

/// OpenAPI documentation for the Tracity API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tracity API",
        version = "1.0.0",
        description = "Statistical datasets for Indian states with chart advice and AI insights.

Tracity serves crime, COVID-19, air-quality and literacy records from a
document store and can summarize them through a completion API.

## Quick Start

1. Check server health: `GET /api/health`
2. List datasets: `GET /api/datasets`
3. Filter records: `POST /api/filter` with `{\"collection\": \"crimes\", \"states\": [\"Kerala\"]}`
",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8001", description = "Local development server")
    ),
    paths(
        root::root,
        health::health_check,
        stats::get_stats,
        datasets::list_datasets,
        filter::filter_data,
        filter::filter_options,
        visualize::visualize,
        insights::get_insights,
        chat::chat,
    ),
    components(
        schemas(
            // Request types
            FilterRequestBody,
            VisualizeQuery,
            ChatRequest,
            // Response types
            RootResponse,
            HealthResponse,
            ServiceStatus,
            StatsResponse,
            DatasetResponse,
            FilterResponse,
            FilterOptionsResponse,
            ChartRecommendationDto,
            InsightDto,
            VisualizationResponse,
            DatasetInsightsResponse,
            ChatResponse,
            ChatResultDto,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and statistics"),
        (name = "datasets", description = "Dataset listing, filtering and visualization"),
        (name = "insights", description = "AI-generated insights and chat"),
    )
)]
pub struct ApiDoc;
