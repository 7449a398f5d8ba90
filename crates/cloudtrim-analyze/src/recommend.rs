//! Recommendation generation.
//!
//! Three fixed rules, each with its own priority tier:
//! 1. every duplicate cluster: remove all copies but the keeper
//! 2. large files in the oldest view past the age threshold: archive or delete
//! 3. type classes above the share threshold: review usage
//!
//! Within a tier, larger savings come first.

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use compact_str::CompactString;
use humansize::{BINARY, format_size};

use cloudtrim_core::{
    AnalysisConfig, DuplicateCluster, FileRecord, Recommendation, RecommendationAction,
};

use crate::categorize::TypeBreakdown;

/// Thresholds used by the rule set.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRules {
    /// Reference point for file ages.
    pub now: DateTime<Utc>,
    /// Files must be strictly older than this.
    pub age_threshold: TimeDelta,
    pub min_large_file_bytes: u64,
    pub type_share_threshold: f64,
    pub max_recommendations: usize,
}

impl RecommendationRules {
    /// Take thresholds from an analysis config, resolving the reference time.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            now: config.reference_time_or_now(),
            age_threshold: config.age_threshold(),
            min_large_file_bytes: config.min_large_file_bytes,
            type_share_threshold: config.type_share_threshold,
            max_recommendations: config.max_recommendations,
        }
    }
}

/// A recommendation plus the keys used to order it within its tier.
struct Candidate {
    recommendation: Recommendation,
    weight: u64,
    tie_break: CompactString,
}

impl Candidate {
    fn sort_key(&self) -> (u32, Reverse<u64>, Reverse<u64>, &str) {
        (
            self.recommendation.priority,
            Reverse(self.recommendation.estimated_bytes_freed),
            Reverse(self.weight),
            self.tie_break.as_str(),
        )
    }
}

/// Produces the prioritized recommendation list.
pub struct RecommendationGenerator {
    rules: RecommendationRules,
}

impl RecommendationGenerator {
    pub fn new(rules: RecommendationRules) -> Self {
        Self { rules }
    }

    /// Apply the rule set and return recommendations, most urgent first,
    /// capped at `max_recommendations`.
    pub fn generate(
        &self,
        breakdown: &TypeBreakdown,
        clusters: &[DuplicateCluster],
        oldest: &[FileRecord],
    ) -> Vec<Recommendation> {
        let mut candidates: Vec<Candidate> = clusters.iter().map(duplicate_candidate).collect();

        let removable: HashSet<&CompactString> =
            clusters.iter().flat_map(|c| c.removable_ids()).collect();
        candidates.extend(
            oldest
                .iter()
                .filter(|r| !removable.contains(&r.id))
                .filter_map(|r| self.aged_candidate(r)),
        );

        candidates.extend(self.type_share_candidates(breakdown));

        candidates.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let produced = candidates.len();
        candidates.truncate(self.rules.max_recommendations);
        if produced > candidates.len() {
            tracing::debug!(
                produced,
                kept = candidates.len(),
                "dropped lowest-priority recommendations"
            );
        }

        candidates.into_iter().map(|c| c.recommendation).collect()
    }

    fn aged_candidate(&self, record: &FileRecord) -> Option<Candidate> {
        if !record.has_known_modified() || record.size_bytes < self.rules.min_large_file_bytes {
            return None;
        }
        let age = self.rules.now.signed_duration_since(record.modified_time);
        if age <= self.rules.age_threshold {
            return None;
        }

        let name = display_name(record);
        let action = RecommendationAction::ArchiveAgedFile;
        Some(Candidate {
            recommendation: Recommendation {
                action,
                target_file_ids: vec![record.id.clone()],
                estimated_bytes_freed: record.size_bytes,
                rationale: format!(
                    "Archive or delete {name} ({}): last modified {}, {} days ago",
                    format_size(record.size_bytes, BINARY),
                    record.modified_time.date_naive(),
                    age.num_days()
                ),
                priority: action.priority(),
            },
            weight: record.size_bytes,
            tie_break: record.id.clone(),
        })
    }

    fn type_share_candidates<'a>(
        &'a self,
        breakdown: &'a TypeBreakdown,
    ) -> impl Iterator<Item = Candidate> + 'a {
        breakdown
            .shares()
            .filter(move |(_, _, share)| *share > self.rules.type_share_threshold)
            .map(|(class, totals, share)| {
                let action = RecommendationAction::ReviewTypeUsage;
                Candidate {
                    recommendation: Recommendation {
                        action,
                        target_file_ids: Vec::new(),
                        estimated_bytes_freed: 0,
                        rationale: format!(
                            "Review {class} storage usage: {} files take {} ({:.0}% of total)",
                            totals.count,
                            format_size(totals.total_bytes, BINARY),
                            share * 100.0
                        ),
                        priority: action.priority(),
                    },
                    weight: totals.total_bytes,
                    tie_break: CompactString::from(class.as_ref()),
                }
            })
    }
}

fn duplicate_candidate(cluster: &DuplicateCluster) -> Candidate {
    let action = RecommendationAction::RemoveDuplicates;
    let targets: Vec<CompactString> = cluster.removable_ids().cloned().collect();
    let name = if cluster.name.is_empty() {
        format!("file {}", cluster.keeper_id)
    } else {
        format!("\"{}\"", cluster.name)
    };

    Candidate {
        recommendation: Recommendation {
            action,
            rationale: format!(
                "Remove {} {} duplicate(s) of {name} ({} each), keep {}",
                targets.len(),
                cluster.confidence,
                format_size(cluster.size_bytes, BINARY),
                cluster.keeper_id
            ),
            target_file_ids: targets,
            estimated_bytes_freed: cluster.reclaimable_bytes,
            priority: action.priority(),
        },
        weight: cluster.reclaimable_bytes,
        tie_break: cluster.keeper_id.clone(),
    }
}

fn display_name(record: &FileRecord) -> String {
    if record.name.is_empty() {
        format!("file {}", record.id)
    } else {
        format!("\"{}\"", record.name)
    }
}
