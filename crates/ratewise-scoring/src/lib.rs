//! Ranking scores and A/B significance testing over rated-item datasets.
//!
//! This crate turns raw rating, vote, time and progress columns into
//! comparable scalar scores, and picks the statistically appropriate
//! two-sample test for experiment groups.
//!
//! # Overview
//!
//! Data flows one way through the crate:
//!
//! 1. **Column extraction** ([`table::TabularSource`]): named numeric and label columns
//! 2. **Rescaling** ([`normalize::normalize`]): min-max scaling into a target range
//! 3. **Bayesian rating** ([`bayesian::bar_score`]): lower confidence bound of a
//!    rating histogram
//! 4. **Bucketed averages** ([`bucket::weighted_bucket_average`]): time-decayed and
//!    progress-weighted means
//! 5. **Composition** ([`composite`]): vote-weighted, weighted-sorting, hybrid and
//!    IMDB-style shrinkage scores
//! 6. **Output** ([`table::TabularSink`]): the derived column is written back
//!
//! [`ab_test::HypothesisTestSelector`] is an independent entry point that
//! consumes two samples (or a group-labelled table) and returns a
//! [`ab_test::TestVerdict`].
//!
//! Every function is pure: the same inputs always produce the same column,
//! and rows can be scored independently of one another.
//!
//! # Examples
//!
//! ## Scoring a table
//!
//! ```
//! use ratewise_scoring::{
//!     bayesian::{self, HistogramColumns},
//!     table::{Table, TabularSink as _},
//! };
//! # fn main() -> Result<(), ratewise_scoring::ScoreError> {
//!
//! let mut table = Table::new()
//!     .with_numeric("1_point", vec![0.0, 3.0])?
//!     .with_numeric("2_point", vec![0.0, 1.0])?
//!     .with_numeric("3_point", vec![1.0, 0.0])?
//!     .with_numeric("4_point", vec![4.0, 0.0])?
//!     .with_numeric("5_point", vec![20.0, 1.0])?;
//!
//! let scores = bayesian::bar_score_column(&table, &HistogramColumns::five_point(), 0.95)?;
//! assert!(scores[0] > scores[1]);
//! table.insert_numeric("bar_score", scores)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Comparing experiment groups
//!
//! ```
//! use ratewise_scoring::ab_test::{Hypothesis, HypothesisTestSelector};
//!
//! let control = [5.0, 5.0, 5.0, 5.0, 5.0];
//! let test = [5.0, 5.0, 5.0, 5.0, 5.0];
//! let verdict = HypothesisTestSelector::default().run(&control, &test).unwrap();
//! assert_eq!(verdict.hypothesis, Hypothesis::FailToRejectH0);
//! ```

use ratewise_stats::TestError;

pub mod bayesian;
pub mod bucket;
pub mod composite;
pub mod config;
pub mod normalize;
pub mod table;

/// Malformed numeric input to one of the scoring components.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ScoreError {
    #[display("cannot rescale a column whose values all equal {value}")]
    DegenerateRange { value: f64 },
    #[display("cannot rescale a column with no finite values")]
    EmptyInput,
    #[display("invalid rating histogram: {_0}")]
    InvalidHistogram(bayesian::HistogramError),
    #[display("insufficient sample: {_0}")]
    InsufficientSample(TestError),
    #[display("statistical test failed: {_0}")]
    TestFailed(TestError),
    #[display("confidence level must lie strictly between 0 and 1, got {level}")]
    InvalidConfidenceLevel { level: f64 },
    #[display("bucket boundaries must be finite and increasing, with one weight per bucket")]
    InvalidBucketSpec,
    #[display("column lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[display("column '{name}' not found")]
    MissingColumn { name: String },
    #[display("column '{name}' is not a {expected} column")]
    WrongColumnType { name: String, expected: &'static str },
    #[display("no rows labelled '{label}' in column '{column}'")]
    EmptyGroup { column: String, label: String },
}

impl From<TestError> for ScoreError {
    fn from(err: TestError) -> Self {
        match err {
            TestError::InsufficientSample { .. } => ScoreError::InsufficientSample(err),
            TestError::NonFiniteValue { .. } | TestError::Undefined { .. } => {
                ScoreError::TestFailed(err)
            }
        }
    }
}

impl From<bayesian::HistogramError> for ScoreError {
    fn from(err: bayesian::HistogramError) -> Self {
        ScoreError::InvalidHistogram(err)
    }
}

pub(crate) fn ensure_same_len(left: usize, right: usize) -> Result<(), ScoreError> {
    if left == right {
        Ok(())
    } else {
        Err(ScoreError::LengthMismatch { left, right })
    }
}
