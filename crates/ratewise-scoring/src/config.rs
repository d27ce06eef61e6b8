//! Tunable parameters shared by the scoring components.
//!
//! [`ScoringConfig::default`] holds the documented defaults. Every field is
//! optional when deserializing, so a config file only needs the values it
//! overrides:
//!
//! ```
//! use ratewise_scoring::config::ScoringConfig;
//!
//! let config: ScoringConfig = serde_json::from_str(r#"{ "min_votes": 500 }"#).unwrap();
//! assert_eq!(config.min_votes, 500.0);
//! assert_eq!(config.confidence_level, 0.95);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    ScoreError,
    bayesian::DEFAULT_CONFIDENCE_LEVEL,
    bucket::BucketSpec,
    composite::{CourseWeights, HybridWeights, SortingWeights},
    normalize::ScaleRange,
};

/// Significance level used by the A/B test selector when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Minimum vote threshold `M` used when none is configured.
pub const DEFAULT_MIN_VOTES: f64 = 2500.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Confidence level for BAR scores.
    pub confidence_level: f64,
    /// Minimum vote threshold `M` for IMDB-style shrinkage.
    pub min_votes: f64,
    pub time_buckets: BucketSpec,
    pub short_time_buckets: BucketSpec,
    pub progress_buckets: BucketSpec,
    pub sorting_weights: SortingWeights,
    pub hybrid_weights: HybridWeights,
    pub course_weights: CourseWeights,
    /// Target range for vote counts before vote-weighting (ten-star scale).
    pub vote_count_range: ScaleRange,
    /// Target range for comment and purchase counts (five-point scale).
    pub engagement_range: ScaleRange,
    /// Significance level for every test the A/B selector runs.
    pub alpha: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            min_votes: DEFAULT_MIN_VOTES,
            time_buckets: BucketSpec::time_default(),
            short_time_buckets: BucketSpec::short_time(),
            progress_buckets: BucketSpec::progress_default(),
            sorting_weights: SortingWeights::default(),
            hybrid_weights: HybridWeights::default(),
            course_weights: CourseWeights::default(),
            vote_count_range: ScaleRange::new(1.0, 10.0),
            engagement_range: ScaleRange::new(1.0, 5.0),
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl ScoringConfig {
    /// Checks the values that have a valid open interval.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for level in [self.confidence_level, self.alpha] {
            if !(level > 0.0 && level < 1.0) {
                return Err(ScoreError::InvalidConfidenceLevel { level });
            }
        }
        Ok(())
    }
}
