//! Loading raw metadata feeds from JSON.
//!
//! Accepts the shapes a listing collaborator typically dumps:
//! - a bare array of file objects
//! - one listing page, `{ "files": [...], "nextPageToken": "..." }`
//! - an array of listing pages
//!
//! Pages are concatenated in order; overlap between pages is left for the
//! normalizer to resolve.

use std::fs;
use std::path::Path;

use serde_json::Value;

use cloudtrim_core::AnalysisError;

/// Parse a feed document into raw records.
pub fn parse_feed(json: &str) -> Result<Vec<Value>, AnalysisError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(flatten_feed(value))
}

/// Read and parse a feed file.
pub fn read_feed(path: impl AsRef<Path>) -> Result<Vec<Value>, AnalysisError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| AnalysisError::Feed {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_feed(&json)?;
    tracing::debug!(path = %path.display(), records = records.len(), "read feed");
    Ok(records)
}

/// Read several feed files (e.g. one per page) into one raw sequence.
pub fn read_feeds<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Value>, AnalysisError> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(read_feed(path)?);
    }
    Ok(records)
}

/// Turn a parsed document into a flat record sequence.
pub fn flatten_feed(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(page_or_record).collect(),
        Value::Object(_) => page_or_record(value),
        other => {
            tracing::warn!(kind = json_kind(&other), "feed is not an array or object");
            Vec::new()
        }
    }
}

fn page_or_record(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut obj) if obj.get("files").is_some_and(Value::is_array) => {
            match obj.remove("files") {
                Some(Value::Array(files)) => files,
                _ => Vec::new(),
            }
        }
        other => vec![other],
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
