//! Storage analysis engine for cloudtrim.
//!
//! Takes the flat metadata listing of a cloud drive and derives:
//!
//! - **Type breakdown** - count and bytes per file type class
//! - **Duplicate clusters** - by content hash, then by name and size
//! - **Ranked views** - largest files, oldest files, clusters by reclaimable space
//! - **Recommendations** - prioritized cleanup actions with estimated savings
//!
//! The engine never performs I/O on file content; it works from metadata
//! already fetched by the caller.
//!
//! ```rust,ignore
//! use cloudtrim_analyze::{analyze_storage, feed};
//! use cloudtrim_core::AnalysisConfig;
//!
//! let raw = feed::read_feed("listing.json")?;
//! let result = analyze_storage(&raw, &AnalysisConfig::default())?;
//!
//! for rec in &result.recommendations {
//!     println!("[{}] {}", rec.priority, rec.rationale);
//! }
//! ```
//!
//! # Duplicate Detection
//!
//! Two tiers, each a single pass over the records:
//!
//! 1. Files sharing a content checksum (and size) form `exact` clusters
//! 2. Remaining non-empty files sharing a normalized name and size form
//!    `probable` clusters
//!
//! ```rust,ignore
//! use cloudtrim_analyze::{DuplicateDetector, normalize};
//!
//! let records = normalize(&raw).records;
//! let report = DuplicateDetector::new().detect(&records);
//! println!("{} clusters, {} bytes reclaimable", report.clusters.len(), report.total_reclaimable());
//! ```

mod analyzer;
pub mod cache;
mod categorize;
mod duplicates;
pub mod feed;
mod normalize;
mod quota;
pub mod ranking;
mod recommend;

pub use analyzer::{StorageAnalyzer, analyze_storage};
pub use cache::{InMemoryScanCache, ScanCache};
pub use categorize::{TypeBreakdown, categorize};
pub use duplicates::{DuplicateDetector, DuplicateReport, normalize_name};
pub use normalize::{NormalizeReport, normalize, normalize_record};
pub use quota::StorageQuota;
pub use ranking::RankedViews;
pub use recommend::{RecommendationGenerator, RecommendationRules};

// Re-export core types
pub use cloudtrim_core::{
    AnalysisConfig, AnalysisError, AnalysisResult, Confidence, DuplicateCluster, FileRecord,
    FileTypeClass, Recommendation, RecommendationAction,
};
