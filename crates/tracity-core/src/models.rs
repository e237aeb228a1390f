//! Domain models shared by the store adapter, services and API layer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored record: field name to JSON value.
pub type Document = Map<String, Value>;

/// Internal identifier field stripped from every record before it leaves the service layer.
pub const INTERNAL_ID_FIELD: &str = "_id";

/// Prefix of collections that belong to the store itself rather than to a dataset.
pub const SYSTEM_COLLECTION_PREFIX: &str = "system.";

/// Returns true for collections that hold dataset records.
pub fn is_data_collection(name: &str) -> bool {
    !name.starts_with(SYSTEM_COLLECTION_PREFIX)
}

/// Removes the internal identifier and normalizes temporal values to text.
///
/// Extended-JSON dates (`{"$date": ...}`) become RFC 3339 strings so the
/// record serializes the same way regardless of how it was imported.
pub fn clean_document(mut doc: Document) -> Document {
    doc.remove(INTERNAL_ID_FIELD);
    for value in doc.values_mut() {
        if let Some(text) = extended_json_date(value) {
            *value = Value::String(text);
        }
    }
    doc
}

/// Cleans every record of a page, preserving order.
pub fn clean_documents(docs: Vec<Document>) -> Vec<Document> {
    docs.into_iter().map(clean_document).collect()
}

/// Extracts the textual form of an extended-JSON date value.
///
/// Accepts both `{"$date": "2021-01-01T00:00:00Z"}` and the canonical
/// `{"$date": {"$numberLong": "1609459200000"}}` forms.
pub fn extended_json_date(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    match obj.get("$date")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => millis_to_rfc3339(n.as_i64()?),
        Value::Object(inner) => {
            let millis = inner.get("$numberLong")?.as_str()?.parse::<i64>().ok()?;
            millis_to_rfc3339(millis)
        }
        _ => None,
    }
}

fn millis_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Converts a collection name into a display name: `covid_stats` → `Covid Stats`.
pub fn display_name(collection: &str) -> String {
    collection
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Summary of one dataset collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub collection: String,
    pub description: String,
    pub record_count: u64,
    pub last_updated: DateTime<Utc>,
}

/// Dashboard counters.
///
/// Visualization, user and insight totals are derived from the number of
/// stored records; only `total_datasets` is an exact count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_visualizations: u64,
    pub total_users: u64,
    pub total_datasets: u64,
    pub total_insights: u64,
}

impl PlatformStats {
    /// Derives the dashboard counters from store totals.
    pub fn from_totals(total_datasets: u64, total_records: u64) -> Self {
        Self {
            total_visualizations: total_records / 100 + 7000,
            total_users: 12000 + total_records / 1000,
            total_datasets,
            total_insights: total_records / 50 + 2500,
        }
    }

    /// Counters reported when the store cannot be reached.
    pub fn unavailable() -> Self {
        Self {
            total_visualizations: 7000,
            total_users: 12000,
            total_datasets: 5,
            total_insights: 2500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_clean_document_strips_internal_id() {
        let cleaned = clean_document(doc(json!({
            "_id": {"$oid": "65f0c0ffee"},
            "state": "Kerala",
            "year": 2021
        })));
        assert!(!cleaned.contains_key("_id"));
        assert_eq!(cleaned["state"], "Kerala");
        assert_eq!(cleaned["year"], 2021);
    }

    #[test]
    fn test_clean_document_normalizes_extended_dates() {
        let cleaned = clean_document(doc(json!({
            "date": {"$date": "2021-03-01T00:00:00Z"},
            "reported": {"$date": {"$numberLong": "1609459200000"}},
            "cases": 10
        })));
        assert_eq!(cleaned["date"], "2021-03-01T00:00:00Z");
        assert_eq!(cleaned["reported"], "2021-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_extended_json_date_ignores_other_objects() {
        assert_eq!(extended_json_date(&json!({"$oid": "abc"})), None);
        assert_eq!(extended_json_date(&json!({"$date": "x", "extra": 1})), None);
        assert_eq!(extended_json_date(&json!("2021-01-01")), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("covid_stats"), "Covid Stats");
        assert_eq!(display_name("crimes"), "Crimes");
        assert_eq!(display_name("AIR_quality"), "Air Quality");
    }

    #[test]
    fn test_is_data_collection() {
        assert!(is_data_collection("crimes"));
        assert!(!is_data_collection("system.views"));
    }

    #[test]
    fn test_platform_stats_from_totals() {
        let stats = PlatformStats::from_totals(4, 25_000);
        assert_eq!(stats.total_visualizations, 7250);
        assert_eq!(stats.total_users, 12025);
        assert_eq!(stats.total_datasets, 4);
        assert_eq!(stats.total_insights, 3000);
    }
}
