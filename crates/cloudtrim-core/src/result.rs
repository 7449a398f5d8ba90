//! Analysis output types.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::class::FileTypeClass;
use crate::record::FileRecord;

/// How strongly a duplicate cluster is believed to share content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Confidence {
    /// Members share a content hash.
    Exact,
    /// Members share a normalized name and size.
    Probable,
}

/// A set of two or more files believed to hold the same content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Member to retain.
    pub keeper_id: CompactString,

    /// All member ids including the keeper, ascending.
    pub member_ids: Vec<CompactString>,

    /// Match tier that produced the cluster.
    pub confidence: Confidence,

    /// Size shared by every member.
    pub size_bytes: u64,

    /// Space recovered by deleting every non-keeper: size * (count - 1).
    pub reclaimable_bytes: u64,

    /// Keeper's display name.
    pub name: CompactString,
}

impl DuplicateCluster {
    /// Number of members.
    pub fn count(&self) -> usize {
        self.member_ids.len()
    }

    /// Members that can be removed while keeping the keeper.
    pub fn removable_ids(&self) -> impl Iterator<Item = &CompactString> {
        self.member_ids.iter().filter(move |id| **id != self.keeper_id)
    }
}

/// Suggested cleanup action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationAction {
    /// Delete every non-keeper member of a duplicate cluster.
    RemoveDuplicates,
    /// Archive or delete a large file untouched for a long time.
    ArchiveAgedFile,
    /// Review a file type class that dominates storage.
    ReviewTypeUsage,
}

impl RecommendationAction {
    /// Fixed priority tier; lower is more urgent.
    pub fn priority(self) -> u32 {
        match self {
            Self::RemoveDuplicates => 1,
            Self::ArchiveAgedFile => 2,
            Self::ReviewTypeUsage => 3,
        }
    }
}

/// One prioritized cleanup suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub target_file_ids: Vec<CompactString>,
    pub estimated_bytes_freed: u64,
    /// Human-readable explanation.
    pub rationale: String,
    /// Lower is more urgent; ties are ordered by bytes freed descending.
    pub priority: u32,
}

/// File count and byte total for one type class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub count: u64,
    pub total_bytes: u64,
}

/// Account quota as reported by the storage provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    pub used_bytes: u64,
    /// `None` when the account has no limit.
    pub limit_bytes: Option<u64>,
    /// `used / limit`, when a limit exists.
    pub used_fraction: Option<f64>,
}

/// Headline numbers for one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Records that survived normalization.
    pub total_files: u64,
    /// Sum of their sizes.
    pub total_bytes: u64,
    /// Raw records dropped as malformed.
    pub skipped_records: u64,
    /// Raw records replaced by a later record with the same id.
    pub overlapping_records: u64,
    /// Files that belong to some duplicate cluster.
    pub duplicate_files: u64,
    /// Sum of reclaimable bytes over all clusters.
    pub reclaimable_bytes: u64,
}

/// Everything one `analyze_storage` call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Per-class totals, largest first.
    pub file_types: IndexMap<FileTypeClass, TypeTotals>,
    pub largest_files: Vec<FileRecord>,
    pub oldest_files: Vec<FileRecord>,
    /// Clusters ordered by reclaimable bytes, descending.
    pub duplicates: Vec<DuplicateCluster>,
    pub recommendations: Vec<Recommendation>,
    pub summary: AnalysisSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaUsage>,
}

impl AnalysisResult {
    /// A result with every collection empty.
    pub fn empty() -> Self {
        Self {
            file_types: IndexMap::new(),
            largest_files: Vec::new(),
            oldest_files: Vec::new(),
            duplicates: Vec::new(),
            recommendations: Vec::new(),
            summary: AnalysisSummary::default(),
            quota: None,
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Sum of bytes freed across all recommendations.
    pub fn total_estimated_savings(&self) -> u64 {
        self.recommendations
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.estimated_bytes_freed))
    }
}
