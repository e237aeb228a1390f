//! Filter query construction.
//!
//! [`build`] turns a [`FilterRequest`] and the [`CollectionSchema`] of the
//! targeted collection into a declarative [`QueryClause`] plus [`SortSpec`].
//! Both are plain values: the document-store adapter decides how to execute
//! them, and [`QueryClause::to_document`] renders the clause in document-query
//! form for responses and logs.
//!
//! Building never fails. Empty filter sets, malformed years and category
//! filters on collections that do not declare one all leave the clause
//! untouched, and an empty clause matches every record.
//!
//! # Example
//!
//! ```
//! use tracity_core::config::CollectionSchema;
//! use tracity_core::filter::{self, FilterRequest, SortDirection};
//!
//! let schema = CollectionSchema::new("covid_stats").date_keyed("date");
//! let request = FilterRequest::new("covid_stats")
//!     .with_states(["Kerala", "Goa"])
//!     .with_years([2021])
//!     .with_sort("cases", SortDirection::Descending);
//!
//! let (clause, sort) = filter::build(&request, &schema);
//! assert_eq!(clause.len(), 2);
//! assert_eq!(sort.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::CollectionSchema;

/// Default number of records requested when the caller does not say.
pub const DEFAULT_LIMIT: usize = 100;

/// Sort direction of a single sort pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parses a request's `sort_order`: `"asc"` is ascending, anything else descending.
    pub fn from_order(order: &str) -> Self {
        if order == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// Short form used in requests and SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Document-query form (`1` / `-1`).
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-supplied filter over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub collection: String,
    pub states: Vec<String>,
    pub years: Vec<i64>,
    /// Domain-specific category labels (crime types for `crimes`).
    pub categories: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortDirection,
    pub limit: usize,
}

impl FilterRequest {
    /// Creates an unfiltered request over `collection` with default sort and limit.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            states: Vec::new(),
            years: Vec::new(),
            categories: Vec::new(),
            sort_by: None,
            sort_order: SortDirection::default(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years<I>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.years = years.into_iter().collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = direction;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A scalar compared against a document field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One constraint of a [`QueryClause`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Field equals the value.
    Equals { field: String, value: FieldValue },
    /// Field is a member of the set.
    In {
        field: String,
        values: BTreeSet<FieldValue>,
    },
    /// Textual field starts with at least one of the prefixes.
    AnyPrefix {
        field: String,
        prefixes: BTreeSet<String>,
    },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::In { field, .. } | Self::AnyPrefix { field, .. } => {
                field
            }
        }
    }

    fn to_document(&self) -> (String, Value) {
        match self {
            Self::Equals { field, value } => (field.clone(), value.to_json()),
            Self::In { field, values } => {
                let values: Vec<Value> = values.iter().map(FieldValue::to_json).collect();
                (field.clone(), json!({ "$in": values }))
            }
            Self::AnyPrefix { field, prefixes } => {
                let alternatives: Vec<Value> = prefixes
                    .iter()
                    .map(|p| json!({ field.as_str(): { "$regex": format!("^{}", p) } }))
                    .collect();
                ("$or".to_string(), Value::Array(alternatives))
            }
        }
    }
}

/// Conjunction of conditions. An empty clause matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryClause {
    conditions: Vec<Condition>,
}

impl QueryClause {
    /// The clause that matches everything.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Finds the first condition on `field`.
    pub fn condition_on(&self, field: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.field() == field)
    }

    /// Renders the clause in document-query form.
    ///
    /// `{"state": {"$in": ["Goa"]}, "$or": [{"date": {"$regex": "^2021"}}]}`.
    /// Conditions that would collide on the same key are nested under `$and`.
    pub fn to_document(&self) -> Value {
        let entries: Vec<(String, Value)> =
            self.conditions.iter().map(Condition::to_document).collect();

        let mut doc = Map::new();
        let collides = entries.iter().any(|(key, _)| {
            let first_seen = doc.insert(key.clone(), Value::Null).is_none();
            !first_seen
        });

        if collides {
            let parts: Vec<Value> = entries
                .into_iter()
                .map(|(key, value)| json!({ key: value }))
                .collect();
            return json!({ "$and": parts });
        }

        Value::Object(entries.into_iter().collect())
    }
}

/// Ordered (field, direction) pairs. At most one pair is produced by [`build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pairs: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// No explicit ordering: records come back in storage order.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            pairs: vec![(field.into(), direction)],
        }
    }

    pub fn pairs(&self) -> &[(String, SortDirection)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `{"field": 1}` / `{"field": -1}`, or `null` when unsorted.
    pub fn to_document(&self) -> Value {
        if self.pairs.is_empty() {
            return Value::Null;
        }
        Value::Object(
            self.pairs
                .iter()
                .map(|(field, dir)| (field.clone(), Value::from(dir.as_i32())))
                .collect(),
        )
    }
}

/// Renders a year as the four-digit prefix of a textual date.
///
/// Years that cannot be written with exactly four digits are malformed.
pub fn year_prefix(year: i64) -> Option<String> {
    (0..=9999).contains(&year).then(|| format!("{:04}", year))
}

/// Builds the query and sort clauses for `request` against `schema`.
pub fn build(request: &FilterRequest, schema: &CollectionSchema) -> (QueryClause, SortSpec) {
    let mut clause = QueryClause::match_all();

    if !request.states.is_empty() {
        clause.push(Condition::In {
            field: schema.state_field.clone(),
            values: request.states.iter().cloned().map(FieldValue::Text).collect(),
        });
    }

    if !request.years.is_empty() {
        match &schema.date_field {
            Some(date_field) => {
                let prefixes: BTreeSet<String> = request
                    .years
                    .iter()
                    .filter_map(|y| year_prefix(*y))
                    .collect();
                // An empty alternative list would match nothing; leave years unfiltered.
                if !prefixes.is_empty() {
                    clause.push(Condition::AnyPrefix {
                        field: date_field.clone(),
                        prefixes,
                    });
                }
            }
            None => {
                clause.push(Condition::In {
                    field: schema.year_field.clone(),
                    values: request.years.iter().copied().map(FieldValue::Int).collect(),
                });
            }
        }
    }

    if let Some(category_field) = &schema.category_field {
        if !request.categories.is_empty() {
            clause.push(Condition::In {
                field: category_field.clone(),
                values: request
                    .categories
                    .iter()
                    .cloned()
                    .map(FieldValue::Text)
                    .collect(),
            });
        }
    }

    let sort = match request.sort_by.as_deref() {
        Some(field) if !field.is_empty() => SortSpec::by(field, request.sort_order),
        _ => SortSpec::none(),
    };

    (clause, sort)
}
