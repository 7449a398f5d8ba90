//! Error types for analysis operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort an analysis call.
///
/// Problems with individual records never surface here; see [`MalformedRecord`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The feed produced no usable records and the caller required some.
    #[error("No file records to analyze")]
    EmptyInput,

    /// A configuration value is out of range or unparseable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A feed file could not be read.
    #[error("Failed to read feed {path}: {source}")]
    Feed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A feed or quota document is not valid JSON.
    #[error("Invalid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the error is the caller's fault (maps to a 4xx at a web boundary).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidConfig { .. })
    }
}

/// Why a raw record was skipped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    /// The entry is not a JSON object.
    NotAnObject,
    /// The `id` field is absent.
    MissingId,
    /// The `id` field is empty or not a string/integer.
    InvalidId,
}

/// A raw record that was skipped, with its position in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalformedRecord {
    /// Zero-based index into the raw feed.
    pub index: usize,
    /// Kind of problem.
    pub reason: MalformedReason,
}

impl MalformedRecord {
    pub fn new(index: usize, reason: MalformedReason) -> Self {
        Self { index, reason }
    }
}
