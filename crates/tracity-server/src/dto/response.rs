//! Response DTOs for API endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use tracity_core::models::Document;
use tracity_core::{
    ChartRecommendation, ChatOutcome, ChatResult, DatasetInfo, DatasetInsights, FilterOptions,
    FilterOutcome, Insight, PlatformStats, Visualization,
};

// =============================================================================
// System
// =============================================================================

/// Service banner.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("healthy" or "degraded")
    pub status: String,
    /// Server version
    pub version: String,
    /// Document store connectivity status
    pub database: ServiceStatus,
    /// Configured completion provider ("openai", "gemini" or "none")
    pub completion_provider: String,
}

/// Status of an individual service component.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    /// Whether the service is reachable
    pub healthy: bool,
    /// Optional message (e.g., error details)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Dashboard statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_visualizations: u64,
    pub total_users: u64,
    pub total_datasets: u64,
    pub total_insights: u64,
}

impl From<PlatformStats> for StatsResponse {
    fn from(s: PlatformStats) -> Self {
        Self {
            total_visualizations: s.total_visualizations,
            total_users: s.total_users,
            total_datasets: s.total_datasets,
            total_insights: s.total_insights,
        }
    }
}

// =============================================================================
// Datasets
// =============================================================================

/// A dataset collection summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetResponse {
    /// Display name, e.g. "Covid Stats"
    pub name: String,
    pub collection: String,
    pub description: String,
    pub record_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl From<DatasetInfo> for DatasetResponse {
    fn from(d: DatasetInfo) -> Self {
        Self {
            name: d.name,
            collection: d.collection,
            description: d.description,
            record_count: d.record_count,
            last_updated: d.last_updated,
        }
    }
}

// =============================================================================
// Charts & insights
// =============================================================================

/// Recommended chart with ranked alternatives.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChartRecommendationDto {
    #[schema(example = "bar")]
    pub recommended: String,
    pub alternatives: Vec<String>,
}

impl From<ChartRecommendation> for ChartRecommendationDto {
    fn from(r: ChartRecommendation) -> Self {
        Self {
            recommended: r.chart.to_string(),
            alternatives: r.alternatives.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Completion-backed analysis of a record sample.
#[derive(Debug, Serialize, ToSchema)]
pub struct InsightDto {
    pub insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub key_metrics: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub anomalies: Vec<Value>,
    /// increasing, decreasing, stable or volatile
    pub trend: String,
}

impl From<Insight> for InsightDto {
    fn from(i: Insight) -> Self {
        Self {
            insight: i.insight,
            chart_type: i.chart_type,
            key_metrics: i.key_metrics,
            anomalies: i.anomalies,
            trend: i.trend,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Filtered records with chart advice.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterResponse {
    pub collection: String,
    /// Applied query in document-query form
    #[schema(value_type = Object)]
    pub query: Value,
    /// Applied sort, null when unsorted
    #[schema(value_type = Object)]
    pub sort: Value,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
    /// Number of records returned
    pub count: usize,
    /// Number of records matching the query
    pub total_matching: u64,
    pub chart_recommendations: ChartRecommendationDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightDto>,
}

impl From<FilterOutcome> for FilterResponse {
    fn from(o: FilterOutcome) -> Self {
        Self {
            collection: o.collection,
            query: o.query,
            sort: o.sort,
            data: o.data,
            count: o.count,
            total_matching: o.total_matching,
            chart_recommendations: o.chart_recommendations.into(),
            insights: o.insights.map(InsightDto::from),
        }
    }
}

/// Distinct values available for filtering a collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterOptionsResponse {
    pub collection: String,
    #[schema(value_type = Vec<Object>)]
    pub states: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub years: Vec<Value>,
    /// Request parameter the categories answer to, e.g. "crime_types"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_param: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub categories: Vec<Value>,
}

impl From<FilterOptions> for FilterOptionsResponse {
    fn from(o: FilterOptions) -> Self {
        Self {
            collection: o.collection,
            states: o.states,
            years: o.years,
            category_param: o.category_param,
            categories: o.categories,
        }
    }
}

// =============================================================================
// Visualize & insights
// =============================================================================

/// A page of records prepared for charting.
#[derive(Debug, Serialize, ToSchema)]
pub struct VisualizationResponse {
    pub collection: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
    pub chart_recommendations: ChartRecommendationDto,
    pub ai_insights: InsightDto,
    /// Number of records returned
    pub total_records: usize,
}

impl From<Visualization> for VisualizationResponse {
    fn from(v: Visualization) -> Self {
        Self {
            collection: v.collection,
            data: v.data,
            chart_recommendations: v.chart_recommendations.into(),
            ai_insights: v.ai_insights.into(),
            total_records: v.total_records,
        }
    }
}

/// Comprehensive analysis of a dataset.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetInsightsResponse {
    pub collection: String,
    pub total_records: u64,
    pub insights: InsightDto,
    pub sample_size: usize,
    pub generated_at: DateTime<Utc>,
}

impl From<DatasetInsights> for DatasetInsightsResponse {
    fn from(d: DatasetInsights) -> Self {
        Self {
            collection: d.collection,
            total_records: d.total_records,
            insights: d.insights.into(),
            sample_size: d.sample_size,
            generated_at: d.generated_at,
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

/// Answer to a chat question.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub query: String,
    pub results: Vec<ChatResultDto>,
    pub total_collections_searched: usize,
}

/// Per-collection answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResultDto {
    pub collection: String,
    pub insight: String,
    pub chart_type: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
    #[schema(value_type = Vec<Object>)]
    pub anomalies: Vec<Value>,
    pub trend: String,
    #[schema(value_type = Vec<Object>)]
    pub key_metrics: Vec<Value>,
    /// Number of sampled records
    pub record_count: usize,
}

impl From<ChatResult> for ChatResultDto {
    fn from(r: ChatResult) -> Self {
        Self {
            collection: r.collection,
            insight: r.insight,
            chart_type: r.chart_type,
            data: r.data,
            anomalies: r.anomalies,
            trend: r.trend,
            key_metrics: r.key_metrics,
            record_count: r.record_count,
        }
    }
}

impl From<ChatOutcome> for ChatResponse {
    fn from(o: ChatOutcome) -> Self {
        Self {
            query: o.query,
            results: o.results.into_iter().map(ChatResultDto::from).collect(),
            total_collections_searched: o.total_collections_searched,
        }
    }
}
