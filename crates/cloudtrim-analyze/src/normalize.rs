//! Conversion of loosely-typed listing records into [`FileRecord`]s.
//!
//! The listing API hands over JSON objects shaped like
//! `{id, name, size, mimeType, modifiedTime, md5Checksum?, parents?}` where
//! any field may be missing and numbers often arrive as strings. This module
//! is the only place that looks at that shape.

use chrono::{DateTime, Utc};
use compact_str::{CompactString, format_compact};
use indexmap::IndexMap;
use serde_json::Value;

use cloudtrim_core::{FileRecord, MalformedReason, MalformedRecord, UNKNOWN_MIME, UNKNOWN_MODIFIED};

/// Checksum fields in preference order, with the prefix stored on the record.
/// Listing sizes are signed 64-bit; anything larger is clamped.
const MAX_SIZE_BYTES: u64 = i64::MAX as u64;

const CHECKSUM_FIELDS: [(&str, &str); 3] = [
    ("md5Checksum", "md5"),
    ("sha1Checksum", "sha1"),
    ("sha256Checksum", "sha256"),
];

/// Output of a normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    /// Unique records, in first-seen order.
    pub records: Vec<FileRecord>,
    /// Raw entries that were skipped.
    pub malformed: Vec<MalformedRecord>,
    /// Raw entries whose id had already been seen (later entry wins).
    pub overlapping: u64,
}

impl NormalizeReport {
    /// Sum of sizes across all normalized records.
    pub fn total_bytes(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.size_bytes))
    }
}

/// Normalize a raw feed.
///
/// Bad entries are skipped and counted; the batch never fails. Entries with a
/// repeated id replace the earlier entry's contents but keep its position.
pub fn normalize(raw: &[Value]) -> NormalizeReport {
    let mut by_id: IndexMap<CompactString, FileRecord> = IndexMap::with_capacity(raw.len());
    let mut malformed = Vec::new();
    let mut overlapping = 0u64;

    for (index, value) in raw.iter().enumerate() {
        match normalize_record(value) {
            Ok(record) => {
                if by_id.insert(record.id.clone(), record).is_some() {
                    overlapping += 1;
                }
            }
            Err(reason) => malformed.push(MalformedRecord::new(index, reason)),
        }
    }

    if !malformed.is_empty() {
        tracing::warn!(skipped = malformed.len(), "skipped malformed file records");
    }
    tracing::debug!(
        raw = raw.len(),
        normalized = by_id.len(),
        overlapping,
        "normalized metadata feed"
    );

    NormalizeReport {
        records: by_id.into_values().collect(),
        malformed,
        overlapping,
    }
}

/// Normalize a single raw entry.
pub fn normalize_record(value: &Value) -> Result<FileRecord, MalformedReason> {
    let obj = value.as_object().ok_or(MalformedReason::NotAnObject)?;

    let id: CompactString = match obj.get("id") {
        None | Some(Value::Null) => return Err(MalformedReason::MissingId),
        Some(Value::String(s)) if !s.trim().is_empty() => s.as_str().into(),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => format_compact!("{n}"),
        Some(_) => return Err(MalformedReason::InvalidId),
    };

    let name = obj.get("name").and_then(Value::as_str).unwrap_or_default();

    let size_bytes = obj
        .get("size")
        .and_then(parse_u64)
        .or_else(|| obj.get("quotaBytesUsed").and_then(parse_u64))
        .map_or(0, |size| size.min(MAX_SIZE_BYTES));

    let mime_type = obj
        .get("mimeType")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_MIME);

    let modified_time = obj
        .get("modifiedTime")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or(UNKNOWN_MODIFIED);

    let mut record = FileRecord::new(id)
        .with_name(name)
        .with_size(size_bytes)
        .with_mime_type(mime_type)
        .with_modified(modified_time);

    record.content_hash = CHECKSUM_FIELDS.iter().find_map(|(field, algo)| {
        let sum = obj.get(*field)?.as_str()?.trim();
        (!sum.is_empty()).then(|| format_compact!("{algo}:{}", sum.to_ascii_lowercase()))
    });

    record.parent_id = obj
        .get("parents")
        .and_then(Value::as_array)
        .and_then(|parents| parents.iter().find_map(Value::as_str))
        .map(CompactString::from);

    Ok(record)
}

/// Read a non-negative integer that may be encoded as a JSON number or a
/// decimal string.
pub(crate) fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp. Times at or before the epoch count as unknown.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(s.trim()).ok()?.with_timezone(&Utc);
    (parsed > UNKNOWN_MODIFIED).then_some(parsed)
}
