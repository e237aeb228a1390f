//! Integration tests for DocumentRepository.
//!
//! These tests verify the repository layer against a real PostgreSQL
//! database. Each test runs in an isolated container.

use serde_json::{Value, json};
use tracity_core::config::CollectionSchema;
use tracity_core::filter::{self, FilterRequest, QueryClause, SortDirection, SortSpec};
use tracity_db::DocumentRepository;

use crate::integration::common::{documents, setup_test_db};

async fn seeded_repo() -> (DocumentRepository, testcontainers::ContainerAsync<testcontainers::GenericImage>) {
    let (pool, container) = setup_test_db().await;
    let repo = DocumentRepository::new(pool);

    repo.insert_many(
        "crimes",
        &documents(json!([
            {"state": "Kerala", "year": 2019, "crime_type": "Theft", "cases_reported": 120},
            {"state": "Goa", "year": 2020, "crime_type": "Murder", "cases_reported": 8},
            {"state": "Kerala", "year": 2020, "crime_type": "Murder", "cases_reported": 15},
            {"state": "Punjab", "year": 2021, "crime_type": "Theft", "cases_reported": 95}
        ])),
    )
    .await
    .expect("insert crimes");

    repo.insert_many(
        "covid_stats",
        &documents(json!([
            {"state": "Kerala", "date": "2020-04-01", "cases": 10},
            {"state": "Kerala", "date": "2021-04-01", "cases": 900},
            {"state": "Goa", "date": "2021-05-01", "cases": 300, "note": null}
        ])),
    )
    .await
    .expect("insert covid_stats");

    (repo, container)
}

#[tokio::test]
async fn test_insert_and_list_collections() {
    let (repo, _container) = seeded_repo().await;

    let collections = repo.list_collections().await.unwrap();

    assert_eq!(collections, vec!["covid_stats", "crimes"]);
    assert_eq!(
        repo.count("crimes", &QueryClause::match_all()).await.unwrap(),
        4
    );
}

#[tokio::test]
async fn test_find_returns_insertion_order_with_id() {
    let (repo, _container) = seeded_repo().await;

    let docs = repo
        .find("crimes", &QueryClause::match_all(), &SortSpec::none(), 10)
        .await
        .unwrap();

    let states: Vec<&Value> = docs.iter().map(|d| &d["state"]).collect();
    assert_eq!(states, vec!["Kerala", "Goa", "Kerala", "Punjab"]);
    assert!(docs.iter().all(|d| d["_id"].is_string()));
}

#[tokio::test]
async fn test_find_with_state_and_year_filter() {
    let (repo, _container) = seeded_repo().await;
    let schema = CollectionSchema::new("crimes").with_category("crime_type", "crime_types");
    let request = FilterRequest::new("crimes")
        .with_states(["Kerala", "Goa"])
        .with_years([2020]);
    let (clause, sort) = filter::build(&request, &schema);

    let docs = repo.find("crimes", &clause, &sort, 100).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d["year"] == 2020));
    assert_eq!(repo.count("crimes", &clause).await.unwrap(), 2);
}

#[tokio::test]
async fn test_find_with_date_prefix_filter() {
    let (repo, _container) = seeded_repo().await;
    let schema = CollectionSchema::new("covid_stats").date_keyed("date");
    let request = FilterRequest::new("covid_stats").with_years([2021]);
    let (clause, sort) = filter::build(&request, &schema);

    let docs = repo.find("covid_stats", &clause, &sort, 100).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(
        docs.iter()
            .all(|d| d["date"].as_str().unwrap().starts_with("2021"))
    );
}

#[tokio::test]
async fn test_find_sorted_and_limited() {
    let (repo, _container) = seeded_repo().await;
    let sort = SortSpec::by("cases_reported", SortDirection::Descending);

    let docs = repo
        .find("crimes", &QueryClause::match_all(), &sort, 2)
        .await
        .unwrap();

    let cases: Vec<&Value> = docs.iter().map(|d| &d["cases_reported"]).collect();
    assert_eq!(cases, vec![120, 95]);
}

#[tokio::test]
async fn test_category_filter() {
    let (repo, _container) = seeded_repo().await;
    let schema = CollectionSchema::new("crimes").with_category("crime_type", "crime_types");
    let request = FilterRequest::new("crimes")
        .with_categories(["Theft"])
        .with_sort("state", SortDirection::Ascending);
    let (clause, sort) = filter::build(&request, &schema);

    let docs = repo.find("crimes", &clause, &sort, 100).await.unwrap();

    let states: Vec<&Value> = docs.iter().map(|d| &d["state"]).collect();
    assert_eq!(states, vec!["Kerala", "Punjab"]);
}

#[tokio::test]
async fn test_distinct_skips_missing_and_null() {
    let (repo, _container) = seeded_repo().await;

    let mut states = repo.distinct("crimes", "state").await.unwrap();
    states.sort_by_key(|v| v.to_string());
    assert_eq!(states, vec![json!("Goa"), json!("Kerala"), json!("Punjab")]);

    let notes = repo.distinct("covid_stats", "note").await.unwrap();
    assert!(notes.is_empty());
}

#[tokio::test]
async fn test_insert_replaces_incoming_id() {
    let (pool, _container) = setup_test_db().await;
    let repo = DocumentRepository::new(pool);

    repo.insert_many("literacy", &documents(json!([{"_id": "legacy", "state": "Goa"}])))
        .await
        .unwrap();

    let docs = repo
        .find("literacy", &QueryClause::match_all(), &SortSpec::none(), 1)
        .await
        .unwrap();
    assert_ne!(docs[0]["_id"], "legacy");
}

#[tokio::test]
async fn test_drop_collection() {
    let (repo, _container) = seeded_repo().await;

    let removed = repo.drop_collection("crimes").await.unwrap();

    assert_eq!(removed, 4);
    assert_eq!(repo.list_collections().await.unwrap(), vec!["covid_stats"]);
}

#[tokio::test]
async fn test_ensure_schema_is_idempotent() {
    let (pool, _container) = setup_test_db().await;
    let repo = DocumentRepository::new(pool);

    repo.ensure_schema().await.unwrap();
    repo.ensure_schema().await.unwrap();
    repo.health_check().await.unwrap();
}
