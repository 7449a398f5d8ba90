//! Analysis configuration types.

use chrono::{DateTime, TimeDelta, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Default number of entries in the largest/oldest views.
pub const DEFAULT_RANK_LIMIT: usize = 20;

/// Default minimum size for an aged file to be worth recommending (10 MiB).
pub const DEFAULT_MIN_LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for one `analyze_storage` call.
///
/// Every field has a default, so a partial JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Length of the largest-files view.
    #[builder(default = "DEFAULT_RANK_LIMIT")]
    pub largest_n: usize,

    /// Length of the oldest-files view.
    #[builder(default = "DEFAULT_RANK_LIMIT")]
    pub oldest_n: usize,

    /// Files older than this many days are candidates for archiving.
    #[builder(default = "365")]
    pub age_threshold_days: u32,

    /// Aged files smaller than this are not recommended.
    #[builder(default = "DEFAULT_MIN_LARGE_FILE_BYTES")]
    pub min_large_file_bytes: u64,

    /// Share of total storage above which a type class gets a review advisory.
    #[builder(default = "0.30")]
    pub type_share_threshold: f64,

    /// Maximum number of recommendations returned.
    #[builder(default = "50")]
    pub max_recommendations: usize,

    /// Fail with [`AnalysisError::EmptyInput`] when no usable records remain.
    #[builder(default = "false")]
    pub strict_nonempty: bool,

    /// Enable the name+size ("probable") duplicate tier.
    #[builder(default = "true")]
    pub heuristic_duplicates: bool,

    /// Reference time for age calculations (default: now).
    #[builder(default)]
    pub reference_time: Option<DateTime<Utc>>,
}

impl AnalysisConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(threshold) = self.type_share_threshold {
            check_share_threshold(threshold)?;
        }
        Ok(())
    }
}

fn check_share_threshold(threshold: f64) -> Result<(), String> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(format!(
            "type_share_threshold must be within [0, 1], got {threshold}"
        ));
    }
    Ok(())
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            largest_n: DEFAULT_RANK_LIMIT,
            oldest_n: DEFAULT_RANK_LIMIT,
            age_threshold_days: 365,
            min_large_file_bytes: DEFAULT_MIN_LARGE_FILE_BYTES,
            type_share_threshold: 0.30,
            max_recommendations: 50,
            strict_nonempty: false,
            heuristic_duplicates: true,
            reference_time: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Parse a (possibly partial) JSON config document and validate it.
    ///
    /// Negative or fractional counts fail here rather than wrapping.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_share_threshold(self.type_share_threshold).map_err(AnalysisError::invalid_config)
    }

    /// Age threshold as a duration.
    pub fn age_threshold(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.age_threshold_days))
    }

    /// The configured reference time, or the current time.
    pub fn reference_time_or_now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}
