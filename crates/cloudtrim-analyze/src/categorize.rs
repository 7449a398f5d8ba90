//! Per-class storage breakdown.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use itertools::Itertools;

use cloudtrim_core::{FileRecord, FileTypeClass, TypeTotals};

/// Aggregated totals per file type class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeBreakdown {
    /// Classes present in the input, largest total first.
    pub totals: IndexMap<FileTypeClass, TypeTotals>,
    /// Sum of all record sizes.
    pub total_bytes: u64,
    /// Number of records aggregated.
    pub total_files: u64,
}

impl TypeBreakdown {
    /// Fraction of total storage occupied by `class` (0.0 when empty).
    pub fn share(&self, class: FileTypeClass) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let bytes = self.totals.get(&class).map_or(0, |t| t.total_bytes);
        bytes as f64 / self.total_bytes as f64
    }

    /// Iterate over `(class, totals, share)` in breakdown order.
    pub fn shares(&self) -> impl Iterator<Item = (FileTypeClass, TypeTotals, f64)> + '_ {
        self.totals
            .iter()
            .map(|(class, totals)| (*class, *totals, self.share(*class)))
    }
}

/// Bucket records by class and sum their sizes.
///
/// Every record lands in exactly one class, so the per-class totals always
/// add up to the input total.
pub fn categorize(records: &[FileRecord]) -> TypeBreakdown {
    let mut by_class: BTreeMap<FileTypeClass, TypeTotals> = BTreeMap::new();
    let mut total_bytes = 0u64;

    for record in records {
        let class = FileTypeClass::classify(&record.mime_type, &record.name);
        let entry = by_class.entry(class).or_default();
        entry.count += 1;
        entry.total_bytes = entry.total_bytes.saturating_add(record.size_bytes);
        total_bytes = total_bytes.saturating_add(record.size_bytes);
    }

    // Stable sort keeps declaration order among equal totals.
    let totals: IndexMap<FileTypeClass, TypeTotals> = by_class
        .into_iter()
        .sorted_by(|a, b| b.1.total_bytes.cmp(&a.1.total_bytes))
        .collect();

    tracing::debug!(classes = totals.len(), total_bytes, "categorized records");

    TypeBreakdown {
        totals,
        total_bytes,
        total_files: records.len() as u64,
    }
}
