//! Integration tests for DataService.

use crate::integration::common::{
    MockCompletionProvider, MockDocumentStore, crimes_records, seeded_store,
};
use serde_json::json;
use tracity_core::traits::DocumentStore;
use tracity_core::{
    AppError, ChartKind, CollectionCatalog, DataService, FilterRequest, Insight, SortDirection,
};

fn service(
    store: MockDocumentStore,
    provider: MockCompletionProvider,
) -> DataService<MockDocumentStore, MockCompletionProvider> {
    DataService::new(store, provider, CollectionCatalog::builtin())
}

#[tokio::test]
async fn test_filter_by_states_and_years() {
    // Arrange
    let service = service(seeded_store(), MockCompletionProvider::new());
    let request = FilterRequest::new("crimes")
        .with_states(["Kerala", "Goa"])
        .with_years([2020, 2021]);

    // Act
    let outcome = service.filter(&request, false).await.unwrap();

    // Assert
    assert_eq!(outcome.count, 3);
    assert_eq!(outcome.total_matching, 3);
    assert!(outcome.data.iter().all(|d| !d.contains_key("_id")));
    assert!(outcome.insights.is_none());
    assert_eq!(
        outcome.query,
        json!({
            "state": {"$in": ["Goa", "Kerala"]},
            "year": {"$in": [2020, 2021]}
        })
    );
}

#[tokio::test]
async fn test_filter_date_keyed_years_use_prefixes() {
    let service = service(seeded_store(), MockCompletionProvider::new());
    let request = FilterRequest::new("covid_stats").with_years([2021]);

    let outcome = service.filter(&request, false).await.unwrap();

    assert_eq!(outcome.count, 2);
    assert!(
        outcome
            .data
            .iter()
            .all(|d| d["date"].as_str().unwrap().starts_with("2021"))
    );
    assert_eq!(
        outcome.chart_recommendations.chart,
        ChartKind::Line,
        "date plus numbers should chart as a line"
    );
}

#[tokio::test]
async fn test_filter_categories_and_sort() {
    let service = service(seeded_store(), MockCompletionProvider::new());
    let request = FilterRequest::new("crimes")
        .with_categories(["Theft"])
        .with_sort("cases_reported", SortDirection::Descending)
        .with_limit(2);

    let outcome = service.filter(&request, false).await.unwrap();

    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.total_matching, 3);
    assert_eq!(outcome.data[0]["cases_reported"], 120);
    assert_eq!(outcome.data[1]["cases_reported"], 95);
    assert_eq!(outcome.sort, json!({"cases_reported": -1}));
}

#[tokio::test]
async fn test_filter_category_ignored_where_unsupported() {
    let service = service(seeded_store(), MockCompletionProvider::new());
    let request = FilterRequest::new("literacy").with_categories(["Theft"]);

    let outcome = service.filter(&request, false).await.unwrap();

    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.query, json!({}));
}

#[tokio::test]
async fn test_filter_unknown_collection_is_not_found() {
    let service = service(seeded_store(), MockCompletionProvider::new());

    let result = service.filter(&FilterRequest::new("weather"), false).await;

    assert!(matches!(result, Err(AppError::CollectionNotFound(name)) if name == "weather"));
}

#[tokio::test]
async fn test_filter_with_insights() {
    let provider = MockCompletionProvider::new();
    let service = service(seeded_store(), provider.clone());

    let outcome = service
        .filter(&FilterRequest::new("crimes"), true)
        .await
        .unwrap();

    let insights = outcome.insights.expect("insights requested");
    assert_eq!(insights.trend, "increasing");
    assert_eq!(provider.prompts().len(), 1);
}

#[tokio::test]
async fn test_filter_options() {
    let service = service(seeded_store(), MockCompletionProvider::new());

    let crimes = service.filter_options("crimes").await.unwrap();
    assert_eq!(crimes.states, vec![json!("Goa"), json!("Kerala"), json!("Punjab")]);
    assert_eq!(crimes.years, vec![json!(2019), json!(2020), json!(2021)]);
    assert_eq!(crimes.category_param.as_deref(), Some("crime_types"));
    assert_eq!(crimes.categories, vec![json!("Murder"), json!("Theft")]);

    let covid = service.filter_options("covid_stats").await.unwrap();
    assert_eq!(covid.years, vec![json!(2020), json!(2021), json!(2022)]);
    assert!(covid.category_param.is_none());
    assert!(covid.categories.is_empty());
}

#[tokio::test]
async fn test_list_datasets() {
    let service = service(
        seeded_store().with_collection("system.views", json!([{"x": 1}])),
        MockCompletionProvider::new(),
    );

    let datasets = service.list_datasets().await.unwrap();

    let names: Vec<&str> = datasets.iter().map(|d| d.collection.as_str()).collect();
    assert_eq!(names, vec!["covid_stats", "crimes", "literacy"]);
    assert_eq!(datasets[0].name, "Covid Stats");
    assert_eq!(datasets[0].description, "COVID-19 statistics and trends data");
    assert_eq!(datasets[1].record_count, 5);
}

#[tokio::test]
async fn test_list_datasets_describes_undeclared_collections() {
    let store = MockDocumentStore::new().with_collection("education_2011", json!([{"a": 1}]));
    let service = service(store, MockCompletionProvider::new());

    let datasets = service.list_datasets().await.unwrap();

    assert_eq!(datasets[0].name, "Education 2011");
    assert_eq!(datasets[0].description, "Education and literacy statistics");
}

#[tokio::test]
async fn test_platform_stats() {
    let service = service(seeded_store(), MockCompletionProvider::new());

    let stats = service.platform_stats().await.unwrap();

    // 11 records across 3 collections
    assert_eq!(stats.total_datasets, 3);
    assert_eq!(stats.total_visualizations, 7000);
    assert_eq!(stats.total_users, 12000);
    assert_eq!(stats.total_insights, 2500);
}

#[tokio::test]
async fn test_platform_stats_propagates_store_errors() {
    let service = service(MockDocumentStore::unavailable(), MockCompletionProvider::new());
    assert!(service.platform_stats().await.is_err());
}

#[tokio::test]
async fn test_visualize() {
    let provider = MockCompletionProvider::new();
    let service = service(seeded_store(), provider.clone());

    let viz = service.visualize("literacy", 20).await.unwrap();

    assert_eq!(viz.total_records, 2);
    // state is categorical, year and literacy_rate are numeric
    assert_eq!(viz.chart_recommendations.chart, ChartKind::Scatter);
    assert_eq!(
        viz.chart_recommendations.alternatives,
        vec![ChartKind::Bubble, ChartKind::Line]
    );
    assert!(provider.prompts()[0].contains("Analyze the literacy dataset"));
}

#[tokio::test]
async fn test_visualize_unknown_collection() {
    let service = service(seeded_store(), MockCompletionProvider::new());
    let result = service.visualize("nope", 20).await;
    assert!(matches!(result, Err(AppError::CollectionNotFound(_))));
}

#[tokio::test]
async fn test_insights_falls_back_when_provider_fails() {
    let service = service(seeded_store(), MockCompletionProvider::failing());

    let insights = service.insights("crimes").await.unwrap();

    assert_eq!(insights.total_records, 5);
    assert_eq!(insights.sample_size, 5);
    assert_eq!(insights.insights, Insight::fallback());
}

#[tokio::test]
async fn test_insights_falls_back_on_unparsable_reply() {
    let service = service(
        seeded_store(),
        MockCompletionProvider::replying(json!("just text")),
    );

    let insights = service.insights("crimes").await.unwrap();

    assert_eq!(insights.insights, Insight::fallback());
}

#[tokio::test]
async fn test_insights_empty_collection() {
    let service = service(seeded_store(), MockCompletionProvider::new());
    let result = service.insights("weather").await;
    assert!(matches!(result, Err(AppError::NoData(name)) if name == "weather"));
}

#[tokio::test]
async fn test_chat_targets_named_dataset() {
    let service = service(seeded_store(), MockCompletionProvider::new());

    let outcome = service
        .chat("Which state has most theft?", Some("crimes"))
        .await
        .unwrap();

    assert_eq!(outcome.total_collections_searched, 1);
    let result = &outcome.results[0];
    assert_eq!(result.collection, "crimes");
    assert_eq!(result.record_count, 5);
    assert_eq!(result.data.len(), 5);
    assert_eq!(result.chart_type, "line");
    assert_eq!(result.insight, "Steady growth across states");
}

#[tokio::test]
async fn test_chat_searches_first_three_collections() {
    let store = seeded_store()
        .with_collection("air_quality", json!([{"state": "Delhi", "avg_aqi": 310}]))
        .with_collection("zoo", json!([{"animal": "tiger"}]));
    let service = service(store, MockCompletionProvider::new());

    let outcome = service.chat("overview", Some("unknown")).await.unwrap();

    assert_eq!(outcome.total_collections_searched, 3);
    let searched: Vec<&str> = outcome.results.iter().map(|r| r.collection.as_str()).collect();
    assert_eq!(searched, vec!["air_quality", "covid_stats", "crimes"]);
}

#[tokio::test]
async fn test_chat_uses_recommended_chart_when_insight_has_none() {
    let service = service(
        seeded_store(),
        MockCompletionProvider::replying(json!({"insight": "ok"})),
    );

    let outcome = service.chat("q", Some("literacy")).await.unwrap();

    assert_eq!(outcome.results[0].chart_type, "scatter");
    assert_eq!(outcome.results[0].trend, "stable");
}

#[tokio::test]
async fn test_inserted_records_become_filterable() {
    let store = MockDocumentStore::new();
    let service = service(store.clone(), MockCompletionProvider::new());
    let docs: Vec<_> = crimes_records()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().cloned().unwrap())
        .collect();

    let inserted = store.insert_many("crimes", &docs).await.unwrap();
    let outcome = service
        .filter(&FilterRequest::new("crimes").with_states(["Punjab"]), false)
        .await
        .unwrap();

    assert_eq!(inserted, 5);
    assert_eq!(store.len("crimes"), 5);
    assert_eq!(outcome.count, 1);
}
