//! Canonical file metadata record.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Sentinel used when the upstream feed has no usable modification time.
pub const UNKNOWN_MODIFIED: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Mime type assigned when the upstream feed omits one.
pub const UNKNOWN_MIME: &str = "unknown";

/// A single file's metadata after normalization.
///
/// Records are immutable once built; every downstream stage borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Opaque identifier, unique across one analyzed set.
    pub id: CompactString,

    /// Display name (may be empty).
    pub name: CompactString,

    /// Size in bytes (0 when unknown).
    pub size_bytes: u64,

    /// Mime type (`"unknown"` when missing).
    pub mime_type: CompactString,

    /// Last modification time ([`UNKNOWN_MODIFIED`] when missing).
    pub modified_time: DateTime<Utc>,

    /// Checksum supplied by the listing API, prefixed with its algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<CompactString>,

    /// Parent folder reference, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CompactString>,
}

impl FileRecord {
    /// Create a record with defaults for every optional field.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            name: CompactString::default(),
            size_bytes: 0,
            mime_type: CompactString::const_new(UNKNOWN_MIME),
            modified_time: UNKNOWN_MODIFIED,
            content_hash: None,
            parent_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<CompactString>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<CompactString>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_modified(mut self, modified_time: DateTime<Utc>) -> Self {
        self.modified_time = modified_time;
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<CompactString>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<CompactString>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Whether the modification time came from the feed.
    pub fn has_known_modified(&self) -> bool {
        self.modified_time != UNKNOWN_MODIFIED
    }

    /// Content hash, if present and non-empty.
    pub fn hash(&self) -> Option<&str> {
        self.content_hash.as_deref().filter(|h| !h.is_empty())
    }

    /// Lowercased extension of the name, without the dot.
    ///
    /// Names without a dot, or whose only dot is the leading one
    /// (`.bashrc`), have no extension.
    pub fn extension(&self) -> Option<String> {
        crate::class::extension_of(&self.name)
    }
}
