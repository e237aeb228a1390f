//! Test utilities and mock implementations for integration tests.
//!
//! `MockDocumentStore` evaluates query clauses in memory so `DataService`
//! can be exercised end to end without a database.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracity_core::filter::{Condition, FieldValue, QueryClause, SortDirection, SortSpec};
use tracity_core::traits::{CompletionProvider, DocumentStore};
use tracity_core::{AppError, Document};

// =============================================================================
// MockDocumentStore
// =============================================================================

/// In-memory document store.
#[derive(Clone, Default)]
pub struct MockDocumentStore {
    collections: Arc<Mutex<BTreeMap<String, Vec<Document>>>>,
    unavailable: bool,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the database were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Seeds a collection from a JSON array of objects.
    pub fn with_collection(self, name: &str, records: Value) -> Self {
        let docs: Vec<Document> = records
            .as_array()
            .expect("records must be an array")
            .iter()
            .map(|r| r.as_object().cloned().expect("record must be an object"))
            .collect();
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), docs);
        self
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable {
            Err(AppError::Generic("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn matching(&self, collection: &str, clause: &QueryClause) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_clause(d, clause))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn field_matches(doc: &Document, field: &str, value: &FieldValue) -> bool {
    doc.get(field) == Some(&value.to_json())
}

fn matches_clause(doc: &Document, clause: &QueryClause) -> bool {
    clause.conditions().iter().all(|condition| match condition {
        Condition::Equals { field, value } => field_matches(doc, field, value),
        Condition::In { field, values } => values.iter().any(|v| field_matches(doc, field, v)),
        Condition::AnyPrefix { field, prefixes } => doc
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| prefixes.iter().any(|p| s.starts_with(p.as_str()))),
    })
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&y.as_f64().unwrap_or_default()),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl DocumentStore for MockDocumentStore {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        self.check()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn count(&self, collection: &str, clause: &QueryClause) -> Result<u64, AppError> {
        self.check()?;
        Ok(self.matching(collection, clause).len() as u64)
    }

    async fn find(
        &self,
        collection: &str,
        clause: &QueryClause,
        sort: &SortSpec,
        limit: usize,
    ) -> Result<Vec<Document>, AppError> {
        self.check()?;
        let mut docs = self.matching(collection, clause);
        if let Some((field, direction)) = sort.pairs().first() {
            docs.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        docs.truncate(limit);
        Ok(docs)
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, AppError> {
        self.check()?;
        let mut values: Vec<Value> = Vec::new();
        for doc in self.matching(collection, &QueryClause::match_all()) {
            if let Some(v) = doc.get(field).filter(|v| !v.is_null()) {
                if !values.contains(v) {
                    values.push(v.clone());
                }
            }
        }
        Ok(values)
    }

    async fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<u64, AppError> {
        self.check()?;
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(docs.iter().cloned());
        Ok(docs.len() as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check()
    }
}

// =============================================================================
// MockCompletionProvider
// =============================================================================

/// Completion provider returning a canned reply and recording prompts.
#[derive(Clone)]
pub struct MockCompletionProvider {
    reply: Option<Value>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionProvider {
    /// Replies with a well-formed insight.
    pub fn new() -> Self {
        Self::replying(json!({
            "insight": "Steady growth across states",
            "chart_type": "line",
            "key_metrics": ["cases_reported"],
            "anomalies": [],
            "trend": "increasing"
        }))
    }

    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every call with an authentication error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete_json(&self, _system: &str, prompt: &str) -> Result<Value, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or_else(|| {
            AppError::LlmError(tracity_core::LlmErrorDetails::new(
                "mock",
                tracity_core::LlmErrorKind::Authentication,
                "invalid key",
                401,
            ))
        })
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn crimes_records() -> Value {
    json!([
        {"_id": "a1", "state": "Kerala", "year": 2019, "crime_type": "Theft", "cases_reported": 120},
        {"_id": "a2", "state": "Goa", "year": 2020, "crime_type": "Murder", "cases_reported": 8},
        {"_id": "a3", "state": "Kerala", "year": 2020, "crime_type": "Murder", "cases_reported": 15},
        {"_id": "a4", "state": "Punjab", "year": 2021, "crime_type": "Theft", "cases_reported": 95},
        {"_id": "a5", "state": "Goa", "year": 2021, "crime_type": "Theft", "cases_reported": 30}
    ])
}

pub fn covid_records() -> Value {
    json!([
        {"_id": "c1", "state": "Kerala", "date": "2020-04-01", "cases": 10, "deaths": 0},
        {"_id": "c2", "state": "Kerala", "date": "2021-04-01", "cases": 900, "deaths": 4},
        {"_id": "c3", "state": "Goa", "date": "2021-05-01", "cases": 300, "deaths": 2},
        {"_id": "c4", "state": "Goa", "date": "2022-01-15", "cases": 50, "deaths": 0}
    ])
}

pub fn literacy_records() -> Value {
    json!([
        {"_id": "l1", "state": "Kerala", "year": 2011, "literacy_rate": 94.0},
        {"_id": "l2", "state": "Bihar", "year": 2011, "literacy_rate": 61.8}
    ])
}

/// Store seeded with the crimes, covid_stats and literacy collections.
pub fn seeded_store() -> MockDocumentStore {
    MockDocumentStore::new()
        .with_collection("crimes", crimes_records())
        .with_collection("covid_stats", covid_records())
        .with_collection("literacy", literacy_records())
}
