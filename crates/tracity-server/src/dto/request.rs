//! Request DTOs for API endpoints.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use tracity_core::filter::{DEFAULT_LIMIT, FilterRequest, SortDirection};

use crate::error::ApiError;

/// Maximum allowed chat query length.
pub const MAX_CHAT_QUERY_LENGTH: usize = 2000;

/// Request body for the filter endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FilterRequestBody {
    /// Collection to query
    #[schema(example = "crimes")]
    pub collection: String,

    /// Restrict to these states
    #[serde(default)]
    pub states: Option<Vec<String>>,

    /// Restrict to these years; integer strings are accepted, other values dropped
    #[serde(default, deserialize_with = "lenient_years")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub years: Option<Vec<i64>>,

    /// Category values, for collections that declare a category field
    #[serde(default, alias = "categories")]
    pub crime_types: Option<Vec<String>>,

    /// Field to sort by
    #[serde(default)]
    pub sort_by: Option<String>,

    /// "asc" for ascending, anything else for descending
    #[serde(default = "default_sort_order")]
    #[schema(example = "asc")]
    pub sort_order: String,

    /// Maximum number of records (default: 100)
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Attach a completion-backed insight to the response
    #[serde(default)]
    pub include_insights: bool,
}

fn default_sort_order() -> String {
    "asc".to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn lenient_years<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|values| values.iter().filter_map(parse_year).collect()))
}

fn parse_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl FilterRequestBody {
    /// Validates the body and converts it into a core filter request.
    ///
    /// The limit is capped at `max_limit`.
    pub fn into_request(self, max_limit: usize) -> Result<FilterRequest, ApiError> {
        if self.collection.trim().is_empty() {
            return Err(ApiError::BadRequest("collection is required".to_string()));
        }
        if self.limit == 0 {
            return Err(ApiError::BadRequest(
                "limit must be greater than zero".to_string(),
            ));
        }

        let mut request = FilterRequest::new(self.collection)
            .with_states(self.states.unwrap_or_default())
            .with_years(self.years.unwrap_or_default())
            .with_categories(self.crime_types.unwrap_or_default())
            .with_limit(self.limit.min(max_limit));

        if let Some(field) = self.sort_by.filter(|f| !f.trim().is_empty()) {
            request = request.with_sort(field, SortDirection::from_order(&self.sort_order));
        }

        Ok(request)
    }
}

/// Query parameters for the visualize endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct VisualizeQuery {
    /// Number of records to return (default: 20)
    #[param(example = 20)]
    pub limit: Option<usize>,
}

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Natural-language question
    #[schema(example = "Which state reported the most thefts?")]
    pub query: String,

    /// Restrict the question to one dataset
    #[serde(default)]
    pub dataset: Option<String>,
}
