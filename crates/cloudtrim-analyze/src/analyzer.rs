//! The `analyze_storage` entry point.

use serde_json::Value;

use cloudtrim_core::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisSummary};

use crate::cache::ScanCache;
use crate::categorize::categorize;
use crate::duplicates::DuplicateDetector;
use crate::normalize::normalize;
use crate::quota::StorageQuota;
use crate::ranking::rank;
use crate::recommend::{RecommendationGenerator, RecommendationRules};

/// Runs the full pipeline: normalize, categorize, detect duplicates, rank,
/// recommend.
///
/// An analyzer holds only configuration; each call works on its own input.
#[derive(Debug, Clone, Default)]
pub struct StorageAnalyzer {
    config: AnalysisConfig,
    quota: Option<StorageQuota>,
}

impl StorageAnalyzer {
    /// Create a new analyzer with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new analyzer with custom config.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            quota: None,
        }
    }

    /// Attach account quota figures to every result.
    pub fn with_quota(mut self, quota: StorageQuota) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a raw metadata feed.
    ///
    /// Fails only on invalid configuration (checked before anything else) or,
    /// in strict mode, when no usable records remain.
    pub fn analyze(&self, raw: &[Value]) -> Result<AnalysisResult, AnalysisError> {
        self.config.validate()?;

        let normalized = normalize(raw);
        if normalized.records.is_empty() && self.config.strict_nonempty {
            return Err(AnalysisError::EmptyInput);
        }
        let records = &normalized.records;

        let breakdown = categorize(records);
        let duplicates = DuplicateDetector::new()
            .with_heuristic(self.config.heuristic_duplicates)
            .detect(records);
        let views = rank(
            records,
            &duplicates.clusters,
            self.config.largest_n,
            self.config.oldest_n,
        );

        let generator = RecommendationGenerator::new(RecommendationRules::from_config(&self.config));
        let recommendations = generator.generate(&breakdown, &views.duplicates, &views.oldest);

        let summary = AnalysisSummary {
            total_files: breakdown.total_files,
            total_bytes: breakdown.total_bytes,
            skipped_records: normalized.malformed.len() as u64,
            overlapping_records: normalized.overlapping,
            duplicate_files: duplicates.clustered_files(),
            reclaimable_bytes: duplicates.total_reclaimable(),
        };

        tracing::info!(
            files = summary.total_files,
            bytes = summary.total_bytes,
            clusters = views.duplicates.len(),
            recommendations = recommendations.len(),
            "storage analysis complete"
        );

        Ok(AnalysisResult {
            file_types: breakdown.totals,
            largest_files: views.largest,
            oldest_files: views.oldest,
            duplicates: views.duplicates,
            recommendations,
            summary,
            quota: self.quota.map(|q| q.usage()),
        })
    }

    /// Return the cached result for `account`, or analyze `raw` and store it.
    ///
    /// Errors are not cached.
    pub fn analyze_cached<C: ScanCache + ?Sized>(
        &self,
        cache: &mut C,
        account: &str,
        raw: &[Value],
    ) -> Result<AnalysisResult, AnalysisError> {
        if let Some(hit) = cache.get(account) {
            tracing::debug!(account, "analysis cache hit");
            return Ok(hit);
        }
        let result = self.analyze(raw)?;
        cache.put(account, result.clone());
        Ok(result)
    }
}

/// Analyze a raw metadata feed with the given configuration.
pub fn analyze_storage(
    raw: &[Value],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    StorageAnalyzer::with_config(config.clone()).analyze(raw)
}
