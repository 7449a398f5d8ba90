//! Duplicate file detection from metadata.
//!
//! Uses a two-tier algorithm, one pass per tier:
//! 1. Group by content hash (and size); groups of 2+ become `exact` clusters
//! 2. Group the remaining files by normalized name and size; groups of 2+
//!    become `probable` clusters
//!
//! A file belongs to at most one cluster: the first tier to claim it wins.

use indexmap::IndexMap;
use itertools::Itertools;

use cloudtrim_core::{Confidence, DuplicateCluster, FileRecord};

use crate::ranking::rank_duplicates;

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateReport {
    /// Clusters, sorted by reclaimable space descending.
    pub clusters: Vec<DuplicateCluster>,

    /// Number of files analyzed.
    pub files_analyzed: u64,

    /// Number of clusters produced by the hash tier.
    pub exact_clusters: usize,

    /// Number of clusters produced by the name+size tier.
    pub probable_clusters: usize,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.clusters.is_empty()
    }

    /// Total files that belong to some cluster.
    pub fn clustered_files(&self) -> u64 {
        self.clusters.iter().map(|c| c.count() as u64).sum()
    }

    /// Total reclaimable space across all clusters.
    pub fn total_reclaimable(&self) -> u64 {
        self.clusters
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.reclaimable_bytes))
    }
}

/// Metadata-only duplicate detector.
pub struct DuplicateDetector {
    heuristic: bool,
}

impl DuplicateDetector {
    /// Create a detector with both tiers enabled.
    pub fn new() -> Self {
        Self { heuristic: true }
    }

    /// Enable or disable the name+size tier.
    pub fn with_heuristic(mut self, enabled: bool) -> Self {
        self.heuristic = enabled;
        self
    }

    /// Find duplicate clusters among normalized records.
    ///
    /// Records are expected to have unique ids (as the normalizer guarantees).
    pub fn detect(&self, records: &[FileRecord]) -> DuplicateReport {
        let mut claimed = vec![false; records.len()];

        let exact = self.exact_tier(records, &mut claimed);
        let probable = if self.heuristic {
            self.heuristic_tier(records, &claimed)
        } else {
            Vec::new()
        };

        let exact_clusters = exact.len();
        let probable_clusters = probable.len();

        let mut clusters = exact;
        clusters.extend(probable);
        let clusters = rank_duplicates(&clusters);

        tracing::debug!(
            files = records.len(),
            exact = exact_clusters,
            probable = probable_clusters,
            "detected duplicate clusters"
        );

        DuplicateReport {
            clusters,
            files_analyzed: records.len() as u64,
            exact_clusters,
            probable_clusters,
        }
    }

    /// Group by `(hash, size)`. Size is part of the key so every member of a
    /// cluster has the same size even when upstream metadata is inconsistent.
    fn exact_tier(&self, records: &[FileRecord], claimed: &mut [bool]) -> Vec<DuplicateCluster> {
        let mut groups: IndexMap<(&str, u64), Vec<usize>> = IndexMap::new();
        for (idx, record) in records.iter().enumerate() {
            if let Some(hash) = record.hash() {
                groups.entry((hash, record.size_bytes)).or_default().push(idx);
            }
        }

        groups
            .into_values()
            .filter(|members| members.len() >= 2)
            .filter_map(|members| {
                for &idx in &members {
                    claimed[idx] = true;
                }
                build_cluster(records, &members, Confidence::Exact)
            })
            .collect()
    }

    /// Group unclaimed, non-empty files by `(normalized name, size)`.
    fn heuristic_tier(&self, records: &[FileRecord], claimed: &[bool]) -> Vec<DuplicateCluster> {
        let mut groups: IndexMap<(String, u64), Vec<usize>> = IndexMap::new();
        for (idx, record) in records.iter().enumerate() {
            if claimed[idx] || record.size_bytes == 0 {
                continue;
            }
            let name = normalize_name(&record.name);
            if name.is_empty() {
                continue;
            }
            groups.entry((name, record.size_bytes)).or_default().push(idx);
        }

        groups
            .into_values()
            .filter_map(|mut members| {
                // Unclaimed hashes are unique, so two hashed members are known
                // to differ.
                let hashed = members.iter().filter(|&&i| records[i].hash().is_some()).count();
                if hashed > 1 {
                    members.retain(|&i| records[i].hash().is_none());
                }
                if members.len() < 2 {
                    return None;
                }
                build_cluster(records, &members, Confidence::Probable)
            })
            .collect()
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase a name and collapse runs of whitespace to a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().join(" ").to_lowercase()
}

/// Pick the keeper: earliest known modification time, then smallest id.
/// Members with an unknown time sort after every known time.
fn select_keeper<'a>(records: &'a [FileRecord], members: &[usize]) -> Option<&'a FileRecord> {
    members
        .iter()
        .map(|&i| &records[i])
        .min_by(|a, b| {
            (!a.has_known_modified(), a.modified_time, &a.id).cmp(&(
                !b.has_known_modified(),
                b.modified_time,
                &b.id,
            ))
        })
}

/// Build a cluster from member indices; `None` for an empty group.
fn build_cluster(
    records: &[FileRecord],
    members: &[usize],
    confidence: Confidence,
) -> Option<DuplicateCluster> {
    let keeper = select_keeper(records, members)?;
    let member_ids = members.iter().map(|&i| records[i].id.clone()).sorted().collect_vec();
    let size_bytes = keeper.size_bytes;

    Some(DuplicateCluster {
        keeper_id: keeper.id.clone(),
        reclaimable_bytes: size_bytes.saturating_mul(member_ids.len() as u64 - 1),
        member_ids,
        confidence,
        size_bytes,
        name: keeper.name.clone(),
    })
}
