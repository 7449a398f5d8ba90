//! Core types and configuration for cloudtrim.
//!
//! This crate provides the data model shared by the analysis engine and its
//! callers: normalized file records, type classes, duplicate clusters,
//! recommendations, and the analysis configuration.

mod class;
mod config;
mod error;
mod record;
mod result;

pub use class::FileTypeClass;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisConfigBuilderError, DEFAULT_MIN_LARGE_FILE_BYTES,
    DEFAULT_RANK_LIMIT,
};
pub use error::{AnalysisError, MalformedReason, MalformedRecord};
pub use record::{FileRecord, UNKNOWN_MIME, UNKNOWN_MODIFIED};
pub use result::{
    AnalysisResult, AnalysisSummary, Confidence, DuplicateCluster, QuotaUsage, Recommendation,
    RecommendationAction, TypeTotals,
};
