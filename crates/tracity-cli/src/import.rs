//! Parsing of import files.
//!
//! Accepts either a JSON array of objects or JSON Lines (one object per
//! line, blank lines ignored).

use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracity_core::Document;

/// Reads and parses an import file.
pub fn read_documents(path: &Path) -> anyhow::Result<Vec<Document>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_documents(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses import file contents into documents.
pub fn parse_documents(contents: &str) -> anyhow::Result<Vec<Document>> {
    let trimmed = contents.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(trimmed).context("Invalid JSON array")?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, value)| into_document(value).with_context(|| format!("Record {}", i + 1)))
            .collect();
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("Invalid JSON on line {}", i + 1))?;
            into_document(value).with_context(|| format!("Line {}", i + 1))
        })
        .collect()
}

fn into_document(value: Value) -> anyhow::Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, found {}", kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
