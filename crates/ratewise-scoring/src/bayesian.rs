//! Bayesian Average Rating (BAR) from per-level vote counts.
//!
//! A [`RatingHistogram`] holds one vote count per discrete rating level
//! (position `i` is level `i + 1`). [`bar_score`] smooths the histogram with
//! one pseudo-vote per level and returns the lower bound of a normal
//! confidence interval around the smoothed mean, so items with few votes are
//! pulled down instead of ranking on a handful of perfect ratings.
//!
//! # Examples
//!
//! ```
//! use ratewise_scoring::bayesian::{RatingHistogram, bar_score};
//!
//! let ten_perfect = RatingHistogram::new(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 10]).unwrap();
//! let score = bar_score(&ten_perfect, 0.95).unwrap();
//! // one pseudo-vote per level keeps ten votes well below a perfect 10
//! assert!(score > 6.0 && score < 7.0);
//! ```

use ratewise_stats::normal;

use crate::{ScoreError, table::TabularSource};

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Why a row could not be read as a rating histogram.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum HistogramError {
    #[display("histogram has no rating levels")]
    Empty,
    #[display("level {level} has negative count {count}")]
    NegativeCount { level: usize, count: f64 },
    #[display("level {level} has non-integral count {count}")]
    NonIntegralCount { level: usize, count: f64 },
}

/// Vote counts per rating level, lowest level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingHistogram {
    counts: Vec<u64>,
}

impl RatingHistogram {
    /// Wraps `counts`; at least one level is required.
    pub fn new(counts: Vec<u64>) -> Result<Self, HistogramError> {
        if counts.is_empty() {
            return Err(HistogramError::Empty);
        }
        Ok(Self { counts })
    }

    /// Reads counts stored as floats, as they arrive from numeric columns.
    ///
    /// Levels in errors are 1-based.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_float_counts<I>(counts: I) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = f64>,
    {
        let counts = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let level = i + 1;
                if count < 0.0 {
                    Err(HistogramError::NegativeCount { level, count })
                } else if !count.is_finite() || count.fract() != 0.0 {
                    Err(HistogramError::NonIntegralCount { level, count })
                } else {
                    Ok(count as u64)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(counts)
    }

    /// Number of rating levels.
    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.counts.len()
    }

    /// Total number of votes.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }
}

/// Bayesian Average Rating: lower confidence bound of the mean rating.
///
/// With `n` levels, `N` votes and `z` the two-sided normal quantile for
/// `confidence_level`, each level `k = i + 1` gets probability
/// `p_i = (c_i + 1) / (N + n)`. The score is `E - z * sqrt(Var)` where
/// `E = sum(k * p_i)` and `Var = (sum(k^2 * p_i) - E^2) / (N + n + 1)`.
///
/// An empty histogram (no votes at all) scores exactly `0.0`.
///
/// # Errors
///
/// [`ScoreError::InvalidConfidenceLevel`] unless `0 < confidence_level < 1`.
#[expect(clippy::cast_precision_loss)]
pub fn bar_score(histogram: &RatingHistogram, confidence_level: f64) -> Result<f64, ScoreError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ScoreError::InvalidConfidenceLevel {
            level: confidence_level,
        });
    }

    let total = histogram.total();
    if total == 0 {
        return Ok(0.0);
    }

    let z = normal::two_sided_z(confidence_level);
    let n = histogram.num_levels() as f64;
    let total = total as f64;

    let (expected, expected_sq) =
        histogram
            .counts
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(e, e2), (i, &count)| {
                let level = (i + 1) as f64;
                let p = (count as f64 + 1.0) / (total + n);
                (e + level * p, e2 + level * level * p)
            });
    // cancellation can push the variance slightly below zero
    let variance = ((expected_sq - expected * expected) / (total + n + 1.0)).max(0.0);

    Ok(expected - z * variance.sqrt())
}

/// Names of the per-level count columns, lowest level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramColumns(Vec<String>);

impl HistogramColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// `1_point` .. `5_point`, as used by course review exports.
    #[must_use]
    pub fn five_point() -> Self {
        Self::new((1..=5).map(|level| format!("{level}_point")))
    }

    /// `one` .. `ten`, as used by ten-star movie rating exports.
    #[must_use]
    pub fn ten_level() -> Self {
        Self::new([
            "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        ])
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// Computes [`bar_score`] for every row of `source`, producing a new column.
///
/// Each row's histogram is read from the columns named by `columns`.
///
/// # Errors
///
/// Fails on the first missing column, on the first row whose counts are not
/// a valid histogram, or on an invalid confidence level.
pub fn bar_score_column<S>(
    source: &S,
    columns: &HistogramColumns,
    confidence_level: f64,
) -> Result<Vec<f64>, ScoreError>
where
    S: TabularSource + ?Sized,
{
    if columns.names().is_empty() {
        return Err(HistogramError::Empty.into());
    }
    let levels = columns
        .names()
        .iter()
        .map(|name| source.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;

    (0..source.num_rows())
        .map(|row| {
            let histogram = RatingHistogram::from_float_counts(levels.iter().map(|c| c[row]))?;
            bar_score(&histogram, confidence_level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::table::Table;

    fn hist(counts: &[u64]) -> RatingHistogram {
        RatingHistogram::new(counts.to_vec()).unwrap()
    }

    #[test]
    fn test_no_votes_scores_zero() {
        assert_eq!(bar_score(&hist(&[0; 10]), 0.95), Ok(0.0));
        assert_eq!(bar_score(&hist(&[0; 5]), 0.99), Ok(0.0));
    }

    #[test]
    fn test_ten_perfect_votes() {
        let score = bar_score(&hist(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 10]), 0.95).unwrap();
        // E = 155/20, E2 = 1385/20, Var = 9.1875 / 21
        assert!(score < 7.75, "score = {score}");
        let expected = 7.75 - 1.959_963_984_540_054 * (9.1875_f64 / 21.0).sqrt();
        assert_abs_diff_eq!(score, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_monotone_in_top_level_votes() {
        let mut counts = vec![4, 1, 7, 2, 3];
        let mut previous = bar_score(&hist(&counts), 0.95).unwrap();
        for _ in 0..50 {
            counts[4] += 1;
            let next = bar_score(&hist(&counts), 0.95).unwrap();
            assert!(next >= previous, "{next} < {previous}");
            previous = next;
        }
    }

    #[test]
    fn test_higher_confidence_is_more_conservative() {
        let h = hist(&[1, 0, 2, 5, 9]);
        assert!(bar_score(&h, 0.99).unwrap() < bar_score(&h, 0.90).unwrap());
    }

    #[test]
    fn test_single_level_has_zero_variance() {
        assert_abs_diff_eq!(bar_score(&hist(&[42]), 0.95).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_confidence_level() {
        for level in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                bar_score(&hist(&[1, 2]), level),
                Err(ScoreError::InvalidConfidenceLevel { .. })
            ));
        }
    }

    #[test]
    fn test_histogram_validation() {
        assert_eq!(RatingHistogram::new(vec![]), Err(HistogramError::Empty));
        assert_eq!(
            RatingHistogram::from_float_counts([1.0, -2.0]),
            Err(HistogramError::NegativeCount {
                level: 2,
                count: -2.0
            })
        );
        assert_eq!(
            RatingHistogram::from_float_counts([1.5]),
            Err(HistogramError::NonIntegralCount {
                level: 1,
                count: 1.5
            })
        );
    }

    #[test]
    fn test_column_scores_each_row() {
        let table = Table::new()
            .with_numeric("1_point", vec![0.0, 0.0, 5.0])
            .unwrap()
            .with_numeric("2_point", vec![0.0, 0.0, 0.0])
            .unwrap()
            .with_numeric("3_point", vec![0.0, 1.0, 0.0])
            .unwrap()
            .with_numeric("4_point", vec![0.0, 0.0, 0.0])
            .unwrap()
            .with_numeric("5_point", vec![0.0, 30.0, 0.0])
            .unwrap();
        let scores = bar_score_column(&table, &HistogramColumns::five_point(), 0.95).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 0.0);
        assert!(scores[1] > scores[2]);
        assert_abs_diff_eq!(
            scores[2],
            bar_score(&hist(&[5, 0, 0, 0, 0]), 0.95).unwrap(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_column_reports_missing_level() {
        let table = Table::new().with_numeric("one", vec![1.0]).unwrap();
        assert_eq!(
            bar_score_column(&table, &HistogramColumns::ten_level(), 0.95),
            Err(ScoreError::MissingColumn { name: "two".into() })
        );
    }
}
