//! Chart recommendation from a sample of records.
//!
//! Only the first record of a sample is inspected. Its fields are bucketed
//! into numeric, categorical and temporal kinds and the first matching rule
//! picks the chart:
//!
//! 1. a temporal and a numeric field: `line`, then `area`, `bar`
//! 2. exactly one categorical and one numeric field: `bar`, then `pie`, `doughnut`
//! 3. two or more numeric fields: `scatter`, then `bubble`, `line`
//! 4. anything else: `bar`, then `pie`, `line`
//!
//! An empty sample yields `bar` with `line`, `pie`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Document;
use crate::models::extended_json_date;

/// Chart kinds understood by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Bubble,
    Doughnut,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Area => "area",
            Self::Bubble => "bubble",
            Self::Doughnut => "doughnut",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary chart plus ranked alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecommendation {
    #[serde(rename = "recommended")]
    pub chart: ChartKind,
    pub alternatives: Vec<ChartKind>,
}

impl ChartRecommendation {
    fn new(chart: ChartKind, alternatives: [ChartKind; 2]) -> Self {
        Self {
            chart,
            alternatives: alternatives.to_vec(),
        }
    }
}

/// Bucket a field value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Categorical,
    Temporal,
}

/// Classifies one value. Nulls, arrays and non-date objects have no kind.
pub fn classify_value(value: &Value) -> Option<FieldKind> {
    match value {
        Value::Number(_) | Value::Bool(_) => Some(FieldKind::Numeric),
        Value::String(s) if is_date_text(s) => Some(FieldKind::Temporal),
        Value::String(_) => Some(FieldKind::Categorical),
        Value::Object(_) if extended_json_date(value).is_some() => Some(FieldKind::Temporal),
        _ => None,
    }
}

/// True for ISO-8601 dates and date-times.
fn is_date_text(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[derive(Debug, Default)]
struct KindCounts {
    numeric: usize,
    categorical: usize,
    temporal: usize,
}

/// Recommends a chart for a page of records.
pub fn recommend(sample: &[Document]) -> ChartRecommendation {
    use ChartKind::*;

    let Some(first) = sample.first() else {
        return ChartRecommendation::new(Bar, [Line, Pie]);
    };

    let mut counts = KindCounts::default();
    for value in first.values() {
        match classify_value(value) {
            Some(FieldKind::Numeric) => counts.numeric += 1,
            Some(FieldKind::Categorical) => counts.categorical += 1,
            Some(FieldKind::Temporal) => counts.temporal += 1,
            None => {}
        }
    }

    if counts.temporal > 0 && counts.numeric > 0 {
        ChartRecommendation::new(Line, [Area, Bar])
    } else if counts.categorical == 1 && counts.numeric == 1 {
        ChartRecommendation::new(Bar, [Pie, Doughnut])
    } else if counts.numeric >= 2 {
        ChartRecommendation::new(Scatter, [Bubble, Line])
    } else {
        ChartRecommendation::new(Bar, [Pie, Line])
    }
}
