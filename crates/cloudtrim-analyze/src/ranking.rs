//! Ordered views over normalized records and duplicate clusters.
//!
//! None of these functions mutate their input. Every ordering ends with an
//! id comparison so repeated runs produce identical output.

use std::cmp::Reverse;

use itertools::Itertools;

use cloudtrim_core::{DuplicateCluster, FileRecord};

/// The three ranked views consumed by the recommendation generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedViews {
    pub largest: Vec<FileRecord>,
    pub oldest: Vec<FileRecord>,
    pub duplicates: Vec<DuplicateCluster>,
}

/// Build all three views.
pub fn rank(
    records: &[FileRecord],
    clusters: &[DuplicateCluster],
    largest_n: usize,
    oldest_n: usize,
) -> RankedViews {
    RankedViews {
        largest: largest_files(records, largest_n),
        oldest: oldest_files(records, oldest_n),
        duplicates: rank_duplicates(clusters),
    }
}

/// Up to `n` records by size descending, ties by id ascending.
pub fn largest_files(records: &[FileRecord], n: usize) -> Vec<FileRecord> {
    records
        .iter()
        .k_smallest_by(n, |a, b| {
            (Reverse(a.size_bytes), &a.id).cmp(&(Reverse(b.size_bytes), &b.id))
        })
        .cloned()
        .collect()
}

/// Up to `n` records by modification time ascending, ties by id ascending.
///
/// Records without a known modification time are left out.
pub fn oldest_files(records: &[FileRecord], n: usize) -> Vec<FileRecord> {
    records
        .iter()
        .filter(|r| r.has_known_modified())
        .k_smallest_by(n, |a, b| (a.modified_time, &a.id).cmp(&(b.modified_time, &b.id)))
        .cloned()
        .collect()
}

/// Clusters by reclaimable space descending, ties by keeper id ascending.
pub fn rank_duplicates(clusters: &[DuplicateCluster]) -> Vec<DuplicateCluster> {
    clusters
        .iter()
        .sorted_by(|a, b| {
            b.reclaimable_bytes
                .cmp(&a.reclaimable_bytes)
                .then_with(|| a.keeper_id.cmp(&b.keeper_id))
        })
        .cloned()
        .collect()
}
