//! Data service: every read operation exposed by the API and the CLI.
//!
//! [`DataService`] ties a [`DocumentStore`], the collection catalog, the
//! filter builder, the chart advisor and the [`InsightService`] together.
//! It is generic over both traits so tests can run it against mocks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::chart::{self, ChartRecommendation};
use crate::config::CollectionCatalog;
use crate::filter::{self, FilterRequest, QueryClause, SortSpec};
use crate::insight::{Insight, InsightService};
use crate::models::{
    DatasetInfo, Document, PlatformStats, clean_documents, display_name, is_data_collection,
};
use crate::traits::{CompletionProvider, DocumentStore};
use crate::AppError;

/// Default page size of the visualize operation.
pub const VISUALIZE_LIMIT: usize = 20;
/// Records sampled for a dataset-wide insight.
pub const INSIGHT_SAMPLE_SIZE: usize = 20;
/// Records sampled per collection when answering a chat query.
pub const CHAT_SAMPLE_SIZE: usize = 10;
/// Records returned per collection in a chat answer.
pub const CHAT_PREVIEW_SIZE: usize = 5;
/// Collections searched when a chat query names no known dataset.
pub const CHAT_MAX_COLLECTIONS: usize = 3;

/// Result of a filter operation.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOutcome {
    pub collection: String,
    /// The query clause in document-query form.
    pub query: Value,
    /// The sort clause in document-query form, `null` when unsorted.
    pub sort: Value,
    pub data: Vec<Document>,
    pub count: usize,
    /// Records matching the clause, ignoring the limit.
    pub total_matching: u64,
    pub chart_recommendations: ChartRecommendation,
    pub insights: Option<Insight>,
}

/// Values a filter form can offer for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub collection: String,
    pub states: Vec<Value>,
    pub years: Vec<Value>,
    /// Request parameter for categories, `None` when the collection has no category filter.
    pub category_param: Option<String>,
    pub categories: Vec<Value>,
}

/// Result of a visualize operation.
#[derive(Debug, Clone, Serialize)]
pub struct Visualization {
    pub collection: String,
    pub data: Vec<Document>,
    pub chart_recommendations: ChartRecommendation,
    pub ai_insights: Insight,
    pub total_records: usize,
}

/// Dataset-wide insight.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInsights {
    pub collection: String,
    pub total_records: u64,
    pub insights: Insight,
    pub sample_size: usize,
    pub generated_at: DateTime<Utc>,
}

/// Answer for one collection in a chat response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub collection: String,
    pub insight: String,
    pub chart_type: String,
    pub data: Vec<Document>,
    pub anomalies: Vec<Value>,
    pub trend: String,
    pub key_metrics: Vec<Value>,
    pub record_count: usize,
}

/// Answer to a chat query.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub query: String,
    pub results: Vec<ChatResult>,
    pub total_collections_searched: usize,
}

impl ChatOutcome {
    /// Reply used when the store cannot be queried.
    pub fn apology(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: vec![ChatResult {
                collection: "sample".to_string(),
                insight: "I apologize, but I'm having trouble accessing the data right now. Please try again.".to_string(),
                chart_type: "bar".to_string(),
                data: Vec::new(),
                anomalies: Vec::new(),
                trend: "stable".to_string(),
                key_metrics: Vec::new(),
                record_count: 0,
            }],
            total_collections_searched: 0,
        }
    }
}

/// Description for collections the catalog does not describe.
pub fn describe_by_name(collection: &str) -> &'static str {
    let name = collection.to_lowercase();
    if name.contains("covid") {
        "COVID-19 statistics and trends data"
    } else if name.contains("crime") {
        "Crime statistics and safety data"
    } else if name.contains("education") || name.contains("literacy") {
        "Education and literacy statistics"
    } else {
        "Dataset containing various data points"
    }
}

/// Read operations over the dataset collections.
///
/// # Type Parameters
///
/// * `S` - Document store implementation
/// * `P` - Completion provider implementation
pub struct DataService<S, P>
where
    S: DocumentStore,
    P: CompletionProvider,
{
    store: S,
    insights: InsightService<P>,
    catalog: Arc<CollectionCatalog>,
}

impl<S, P> Clone for DataService<S, P>
where
    S: DocumentStore,
    P: CompletionProvider,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            insights: self.insights.clone(),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<S, P> DataService<S, P>
where
    S: DocumentStore,
    P: CompletionProvider,
{
    pub fn new(store: S, provider: P, catalog: CollectionCatalog) -> Self {
        Self {
            store,
            insights: InsightService::new(provider),
            catalog: Arc::new(catalog),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &CollectionCatalog {
        &self.catalog
    }

    /// The completion provider behind insights.
    pub fn insight_provider(&self) -> &P {
        self.insights.provider()
    }

    /// Collections holding dataset records.
    pub async fn data_collections(&self) -> Result<Vec<String>, AppError> {
        let collections = self.store.list_collections().await?;
        Ok(collections
            .into_iter()
            .filter(|c| is_data_collection(c))
            .collect())
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), AppError> {
        if self.data_collections().await?.iter().any(|c| c == collection) {
            Ok(())
        } else {
            Err(AppError::CollectionNotFound(collection.to_string()))
        }
    }

    fn description_for(&self, collection: &str) -> String {
        self.catalog
            .find(collection)
            .and_then(|schema| schema.description.clone())
            .unwrap_or_else(|| describe_by_name(collection).to_string())
    }

    /// Summaries of every dataset collection.
    pub async fn list_datasets(&self) -> Result<Vec<DatasetInfo>, AppError> {
        let collections = self.data_collections().await?;
        let mut datasets = Vec::with_capacity(collections.len());

        for collection in collections {
            let record_count = self
                .store
                .count(&collection, &QueryClause::match_all())
                .await?;
            datasets.push(DatasetInfo {
                name: display_name(&collection),
                description: self.description_for(&collection),
                collection,
                record_count,
                last_updated: Utc::now(),
            });
        }

        Ok(datasets)
    }

    /// Dashboard counters derived from store totals.
    pub async fn platform_stats(&self) -> Result<PlatformStats, AppError> {
        let collections = self.store.list_collections().await?;
        let mut total_records = 0u64;
        for collection in &collections {
            total_records += self
                .store
                .count(collection, &QueryClause::match_all())
                .await?;
        }
        Ok(PlatformStats::from_totals(
            collections.len() as u64,
            total_records,
        ))
    }

    /// Runs a filter request against its collection.
    pub async fn filter(
        &self,
        request: &FilterRequest,
        include_insights: bool,
    ) -> Result<FilterOutcome, AppError> {
        self.ensure_collection(&request.collection).await?;

        let schema = self.catalog.schema_for(&request.collection);
        let (clause, sort) = filter::build(request, &schema);

        tracing::debug!(
            collection = %request.collection,
            query = %clause.to_document(),
            "Running filter"
        );

        let docs = self
            .store
            .find(&request.collection, &clause, &sort, request.limit)
            .await?;
        let total_matching = self.store.count(&request.collection, &clause).await?;
        let data = clean_documents(docs);
        let chart_recommendations = chart::recommend(&data);

        let insights = if include_insights && !data.is_empty() {
            let query = format!("Analyze filtered {} data", request.collection);
            Some(self.insights.analyze(&data, &query).await)
        } else {
            None
        };

        Ok(FilterOutcome {
            collection: request.collection.clone(),
            query: clause.to_document(),
            sort: sort.to_document(),
            count: data.len(),
            data,
            total_matching,
            chart_recommendations,
            insights,
        })
    }

    /// Distinct filter values available in a collection.
    pub async fn filter_options(&self, collection: &str) -> Result<FilterOptions, AppError> {
        self.ensure_collection(collection).await?;
        let schema = self.catalog.schema_for(collection);

        let mut states = self.store.distinct(collection, &schema.state_field).await?;
        sort_values(&mut states);

        let mut years = self
            .store
            .distinct(collection, schema.temporal_field())
            .await?;
        if schema.is_date_keyed() {
            years = year_prefixes(&years);
        }
        sort_values(&mut years);

        let (category_param, categories) = match &schema.category_field {
            Some(field) => {
                let mut values = self.store.distinct(collection, field).await?;
                sort_values(&mut values);
                (Some(schema.category_param.clone()), values)
            }
            None => (None, Vec::new()),
        };

        Ok(FilterOptions {
            collection: collection.to_string(),
            states,
            years,
            category_param,
            categories,
        })
    }

    /// A page of records with a chart recommendation and an insight.
    pub async fn visualize(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Visualization, AppError> {
        self.ensure_collection(collection).await?;

        let docs = self
            .store
            .find(collection, &QueryClause::match_all(), &SortSpec::none(), limit)
            .await?;
        let data = clean_documents(docs);
        let chart_recommendations = chart::recommend(&data);
        let ai_insights = self
            .insights
            .analyze(&data, &format!("Analyze the {} dataset", collection))
            .await;

        Ok(Visualization {
            collection: collection.to_string(),
            total_records: data.len(),
            data,
            chart_recommendations,
            ai_insights,
        })
    }

    /// A comprehensive insight over a sample of the collection.
    pub async fn insights(&self, collection: &str) -> Result<DatasetInsights, AppError> {
        let sample = self
            .store
            .find(
                collection,
                &QueryClause::match_all(),
                &SortSpec::none(),
                INSIGHT_SAMPLE_SIZE,
            )
            .await?;

        if sample.is_empty() {
            return Err(AppError::NoData(collection.to_string()));
        }

        let sample = clean_documents(sample);
        let query = format!(
            "Provide comprehensive analysis of the {} dataset including trends, patterns, and key findings",
            collection
        );
        let insights = self.insights.analyze(&sample, &query).await;
        let total_records = self
            .store
            .count(collection, &QueryClause::match_all())
            .await?;

        Ok(DatasetInsights {
            collection: collection.to_string(),
            total_records,
            insights,
            sample_size: sample.len(),
            generated_at: Utc::now(),
        })
    }

    /// Answers a natural-language question about one or several datasets.
    pub async fn chat(&self, query: &str, dataset: Option<&str>) -> Result<ChatOutcome, AppError> {
        let collections = self.data_collections().await?;

        let targets: Vec<String> = match dataset {
            Some(name) if collections.iter().any(|c| c == name) => vec![name.to_string()],
            _ => collections
                .into_iter()
                .take(CHAT_MAX_COLLECTIONS)
                .collect(),
        };

        let mut results = Vec::new();
        for collection in &targets {
            let sample = self
                .store
                .find(
                    collection,
                    &QueryClause::match_all(),
                    &SortSpec::none(),
                    CHAT_SAMPLE_SIZE,
                )
                .await?;
            if sample.is_empty() {
                continue;
            }

            let sample = clean_documents(sample);
            let insight = self.insights.analyze(&sample, query).await;
            let recommendation = chart::recommend(&sample);
            let record_count = sample.len();
            let data: Vec<Document> = sample.into_iter().take(CHAT_PREVIEW_SIZE).collect();

            results.push(ChatResult {
                collection: collection.clone(),
                insight: insight.insight,
                chart_type: insight
                    .chart_type
                    .unwrap_or_else(|| recommendation.chart.to_string()),
                data,
                anomalies: insight.anomalies,
                trend: insight.trend,
                key_metrics: insight.key_metrics,
                record_count,
            });
        }

        Ok(ChatOutcome {
            query: query.to_string(),
            results,
            total_collections_searched: targets.len(),
        })
    }
}

/// Distinct four-digit year prefixes of textual dates.
fn year_prefixes(dates: &[Value]) -> Vec<Value> {
    let mut years: Vec<i64> = dates
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| s.get(..4))
        .filter(|prefix| prefix.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|prefix| prefix.parse().ok())
        .collect();
    years.sort_unstable();
    years.dedup();
    years.into_iter().map(Value::from).collect()
}

/// Numbers first in numeric order, then text in lexical order.
fn sort_values(values: &mut [Value]) {
    values.sort_by(|a, b| match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::Number(_), _) => std::cmp::Ordering::Less,
        (_, Value::Number(_)) => std::cmp::Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    });
}
