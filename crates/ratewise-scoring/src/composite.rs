//! Composite scores built from normalized counts, ratings and BAR scores.
//!
//! The scalar functions combine one row's inputs; the `*_column` variants
//! apply them elementwise over equally long columns. Weights are percentages
//! and are never renormalized, so weights that do not sum to 100 scale the
//! result accordingly.

use ratewise_stats::descriptive;
use serde::{Deserialize, Serialize};

use crate::{ScoreError, ensure_same_len};

/// Weights for [`weighted_sorting_score`], in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingWeights {
    pub comment: f64,
    pub purchase: f64,
    pub rating: f64,
}

impl Default for SortingWeights {
    fn default() -> Self {
        Self {
            comment: 32.0,
            purchase: 26.0,
            rating: 42.0,
        }
    }
}

/// Weights for [`hybrid_score`], in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub bar: f64,
    pub wss: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            bar: 60.0,
            wss: 40.0,
        }
    }
}

/// Weights for [`course_weighted_rating`], in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseWeights {
    pub time: f64,
    pub user: f64,
}

impl Default for CourseWeights {
    fn default() -> Self {
        Self {
            time: 50.0,
            user: 50.0,
        }
    }
}

/// Rating scaled by normalized popularity.
#[must_use]
pub fn vote_weighted_score(rating: f64, vote_count_normalized: f64) -> f64 {
    rating * vote_count_normalized
}

/// Weighted sum of normalized comment and purchase counts and the rating.
///
/// # Examples
///
/// ```
/// use ratewise_scoring::composite::weighted_sorting_score;
///
/// let score = weighted_sorting_score(5.0, 1.0, 4.5, 32.0, 26.0, 42.0);
/// assert!((score - 3.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn weighted_sorting_score(
    comment_count_norm: f64,
    purchase_count_norm: f64,
    rating: f64,
    comment_weight: f64,
    purchase_weight: f64,
    rating_weight: f64,
) -> f64 {
    comment_count_norm * comment_weight / 100.0
        + purchase_count_norm * purchase_weight / 100.0
        + rating * rating_weight / 100.0
}

/// Blend of a BAR score and a weighted sorting score.
#[must_use]
pub fn hybrid_score(bar_score: f64, wss_score: f64, bar_weight: f64, wss_weight: f64) -> f64 {
    bar_score * bar_weight / 100.0 + wss_score * wss_weight / 100.0
}

/// Blend of the time-based and user-based (progress) bucket averages.
#[must_use]
pub fn course_weighted_rating(
    time_average: f64,
    user_average: f64,
    time_weight: f64,
    user_weight: f64,
) -> f64 {
    time_average * time_weight / 100.0 + user_average * user_weight / 100.0
}

/// IMDB-style shrinkage of `rating` toward `global_mean`.
///
/// Items with few votes relative to `min_votes` stay close to the global
/// mean; items with many votes keep their own rating.
///
/// ```
/// use ratewise_scoring::composite::imdb_weighted_rating;
///
/// assert_eq!(imdb_weighted_rating(9.0, 0.0, 2500.0, 6.0), 6.0);
/// assert_eq!(imdb_weighted_rating(9.0, 2500.0, 2500.0, 6.0), 7.5);
/// ```
#[must_use]
pub fn imdb_weighted_rating(rating: f64, vote_count: f64, min_votes: f64, global_mean: f64) -> f64 {
    let total = vote_count + min_votes;
    (vote_count / total) * rating + (min_votes / total) * global_mean
}

/// Prior used by [`imdb_weighted_rating`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShrinkageParams {
    /// Minimum vote threshold `M`.
    pub min_votes: f64,
    /// Global mean rating `C`.
    pub global_mean: f64,
}

impl ShrinkageParams {
    /// Takes `C` as the mean of the finite entries of `ratings`.
    ///
    /// # Errors
    ///
    /// [`ScoreError::EmptyInput`] if `ratings` has no finite entry.
    pub fn from_ratings(ratings: &[f64], min_votes: f64) -> Result<Self, ScoreError> {
        let finite = ratings
            .iter()
            .copied()
            .filter(|r| r.is_finite())
            .collect::<Vec<_>>();
        let global_mean = descriptive::mean(&finite).ok_or(ScoreError::EmptyInput)?;
        Ok(Self {
            min_votes,
            global_mean,
        })
    }

    #[must_use]
    pub fn apply(&self, rating: f64, vote_count: f64) -> f64 {
        imdb_weighted_rating(rating, vote_count, self.min_votes, self.global_mean)
    }
}

/// [`vote_weighted_score`] over two columns.
pub fn vote_weighted_column(
    ratings: &[f64],
    vote_counts_normalized: &[f64],
) -> Result<Vec<f64>, ScoreError> {
    ensure_same_len(ratings.len(), vote_counts_normalized.len())?;
    Ok(ratings
        .iter()
        .zip(vote_counts_normalized)
        .map(|(&r, &v)| vote_weighted_score(r, v))
        .collect())
}

/// [`weighted_sorting_score`] over three columns.
pub fn weighted_sorting_column(
    comment_counts_norm: &[f64],
    purchase_counts_norm: &[f64],
    ratings: &[f64],
    weights: SortingWeights,
) -> Result<Vec<f64>, ScoreError> {
    ensure_same_len(comment_counts_norm.len(), purchase_counts_norm.len())?;
    ensure_same_len(comment_counts_norm.len(), ratings.len())?;
    Ok(comment_counts_norm
        .iter()
        .zip(purchase_counts_norm)
        .zip(ratings)
        .map(|((&c, &p), &r)| {
            weighted_sorting_score(c, p, r, weights.comment, weights.purchase, weights.rating)
        })
        .collect())
}

/// [`hybrid_score`] over two columns.
pub fn hybrid_column(
    bar_scores: &[f64],
    wss_scores: &[f64],
    weights: HybridWeights,
) -> Result<Vec<f64>, ScoreError> {
    ensure_same_len(bar_scores.len(), wss_scores.len())?;
    Ok(bar_scores
        .iter()
        .zip(wss_scores)
        .map(|(&b, &w)| hybrid_score(b, w, weights.bar, weights.wss))
        .collect())
}

/// [`imdb_weighted_rating`] over two columns with a shared prior.
pub fn imdb_weighted_column(
    ratings: &[f64],
    vote_counts: &[f64],
    params: ShrinkageParams,
) -> Result<Vec<f64>, ScoreError> {
    ensure_same_len(ratings.len(), vote_counts.len())?;
    Ok(ratings
        .iter()
        .zip(vote_counts)
        .map(|(&r, &v)| params.apply(r, v))
        .collect())
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn test_weighted_sorting_defaults() {
        let w = SortingWeights::default();
        let score = weighted_sorting_score(5.0, 1.0, 4.5, w.comment, w.purchase, w.rating);
        assert_abs_diff_eq!(score, 3.75, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_are_not_renormalized() {
        assert_abs_diff_eq!(hybrid_score(4.0, 2.0, 100.0, 100.0), 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            course_weighted_rating(4.0, 5.0, 50.0, 50.0),
            4.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_vote_weighted_score() {
        assert_eq!(vote_weighted_score(8.0, 2.5), 20.0);
        assert_eq!(
            vote_weighted_column(&[8.0, 6.0], &[1.0, 10.0]).unwrap(),
            vec![8.0, 60.0]
        );
    }

    #[test]
    fn test_shrinkage_limits() {
        assert_abs_diff_eq!(
            imdb_weighted_rating(9.2, 0.0, 2500.0, 6.8),
            6.8,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            imdb_weighted_rating(9.2, 1e12, 2500.0, 6.8),
            9.2,
            max_relative = 1e-8
        );
        let mut previous = 6.8;
        for votes in [10.0, 100.0, 1_000.0, 10_000.0] {
            let next = imdb_weighted_rating(9.2, votes, 2500.0, 6.8);
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_shrinkage_params_from_ratings() {
        let params = ShrinkageParams::from_ratings(&[6.0, f64::NAN, 8.0], 100.0).unwrap();
        assert_abs_diff_eq!(params.global_mean, 7.0, epsilon = 1e-12);
        assert_eq!(
            imdb_weighted_column(&[9.0], &[100.0], params).unwrap(),
            vec![8.0]
        );
        assert_eq!(
            ShrinkageParams::from_ratings(&[], 100.0),
            Err(ScoreError::EmptyInput)
        );
    }

    #[test]
    fn test_columns_check_lengths() {
        assert_eq!(
            hybrid_column(&[1.0, 2.0], &[1.0], HybridWeights::default()),
            Err(ScoreError::LengthMismatch { left: 2, right: 1 })
        );
        assert!(
            weighted_sorting_column(&[1.0], &[1.0], &[], SortingWeights::default()).is_err()
        );
    }
}
