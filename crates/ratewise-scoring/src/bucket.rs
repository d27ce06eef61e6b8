//! Bucketed weighted averages over a continuous partition key.
//!
//! A [`BucketSpec`] splits a dimension such as days-since-rating or
//! percent-progress into disjoint ranges, each carrying a percentage weight.
//! [`weighted_bucket_average`] averages the values in each bucket and sums
//! the bucket means scaled by their weights.
//!
//! # Bucket edges
//!
//! With ascending boundaries `b0 < b1 < ... < b_last`:
//!
//! - the first bucket holds `key <= b0`
//! - bucket `i` holds `b_{i-1} < key <= b_i`
//! - the last bucket holds `key > b_last`
//!
//! # Empty buckets
//!
//! A bucket without observations has a `NaN` mean, and the weighted sum that
//! includes it is `NaN` too. This is logged at `warn` level and visible in
//! [`bucket_summaries`]; it is never replaced by zero.
//!
//! # Examples
//!
//! ```
//! use ratewise_scoring::bucket::{BucketSpec, weighted_bucket_average};
//!
//! let spec = BucketSpec::new(vec![10.0], vec![40.0, 60.0]).unwrap();
//! let avg = weighted_bucket_average(&[4.0, 5.0, 3.0], &[1.0, 5.0, 20.0], &spec).unwrap();
//! // (4.5 * 40 + 3.0 * 60) / 100
//! assert!((avg - 3.6).abs() < 1e-12);
//! ```

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ScoreError, ensure_same_len};

/// Ascending bucket boundaries with one weight per bucket.
///
/// `weights.len()` is always `boundaries.len() + 1`; the extra weight belongs
/// to the open-ended last bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBucketSpec")]
pub struct BucketSpec {
    boundaries: Vec<f64>,
    weights: Vec<f64>,
}

#[derive(Deserialize)]
struct RawBucketSpec {
    boundaries: Vec<f64>,
    weights: Vec<f64>,
}

impl TryFrom<RawBucketSpec> for BucketSpec {
    type Error = ScoreError;

    fn try_from(raw: RawBucketSpec) -> Result<Self, Self::Error> {
        Self::new(raw.boundaries, raw.weights)
    }
}

impl BucketSpec {
    /// Validates boundaries (finite, strictly increasing) and weight count.
    pub fn new(boundaries: Vec<f64>, weights: Vec<f64>) -> Result<Self, ScoreError> {
        let increasing = boundaries.windows(2).all(|w| w[0] < w[1]);
        if !increasing
            || boundaries.iter().any(|b| !b.is_finite())
            || weights.len() != boundaries.len() + 1
            || weights.iter().any(|w| !w.is_finite())
        {
            return Err(ScoreError::InvalidBucketSpec);
        }
        Ok(Self {
            boundaries,
            weights,
        })
    }

    /// One bucket covering every key, with weight `weight`.
    #[must_use]
    pub fn single(weight: f64) -> Self {
        Self {
            boundaries: vec![],
            weights: vec![weight],
        }
    }

    /// Days since rating: `<=30 / <=90 / <=180 / >180` at `28 / 26 / 24 / 22`.
    #[must_use]
    pub fn time_default() -> Self {
        Self {
            boundaries: vec![30.0, 90.0, 180.0],
            weights: vec![28.0, 26.0, 24.0, 22.0],
        }
    }

    /// Days since rating for short-lived items: `<=30 / <=60 / >60` at `30 / 35 / 35`.
    #[must_use]
    pub fn short_time() -> Self {
        Self {
            boundaries: vec![30.0, 60.0],
            weights: vec![30.0, 35.0, 35.0],
        }
    }

    /// Percent progress: `<=10 / <=45 / <=75 / >75` at `22 / 24 / 26 / 28`.
    #[must_use]
    pub fn progress_default() -> Self {
        Self {
            boundaries: vec![10.0, 45.0, 75.0],
            weights: vec![22.0, 24.0, 26.0, 28.0],
        }
    }

    #[must_use]
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.weights.len()
    }

    /// Index of the bucket holding `key`, or `None` for `NaN`.
    #[must_use]
    pub fn bucket_of(&self, key: f64) -> Option<usize> {
        if key.is_nan() {
            return None;
        }
        Some(self.boundaries.partition_point(|b| *b < key))
    }

    /// Key range of bucket `index` as `(exclusive lower, inclusive upper)`,
    /// or `None` past the last bucket.
    #[must_use]
    pub fn range(&self, index: usize) -> Option<BucketRange> {
        (index < self.num_buckets()).then(|| BucketRange {
            lower: index
                .checked_sub(1)
                .and_then(|i| self.boundaries.get(i).copied()),
            upper: self.boundaries.get(index).copied(),
        })
    }

    /// Key ranges of every bucket, in bucket order.
    pub fn ranges(&self) -> impl Iterator<Item = BucketRange> + '_ {
        (0..self.num_buckets()).filter_map(|index| self.range(index))
    }
}

/// Key range of a single bucket; `None` marks an open end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl fmt::Display for BucketRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (None, None) => write!(f, "all"),
            (None, Some(upper)) => write!(f, "<= {upper}"),
            (Some(lower), None) => write!(f, "> {lower}"),
            (Some(lower), Some(upper)) => write!(f, "({lower}, {upper}]"),
        }
    }
}

/// Per-bucket contribution to a weighted average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub range: BucketRange,
    pub weight: f64,
    /// Number of non-`NaN` values that fell into the bucket.
    pub count: usize,
    /// Mean of those values; `NaN` when `count == 0`.
    pub mean: f64,
}

impl BucketSummary {
    /// `mean * weight / 100`.
    #[must_use]
    pub fn contribution(&self) -> f64 {
        self.mean * self.weight / 100.0
    }
}

/// Groups `values` by the bucket of the parallel `keys` entry and averages
/// each bucket.
///
/// Rows with a `NaN` key or a `NaN` value are left out of every bucket.
///
/// # Errors
///
/// [`ScoreError::LengthMismatch`] when `values` and `keys` differ in length.
#[expect(clippy::cast_precision_loss)]
pub fn bucket_summaries(
    values: &[f64],
    keys: &[f64],
    buckets: &BucketSpec,
) -> Result<Vec<BucketSummary>, ScoreError> {
    ensure_same_len(values.len(), keys.len())?;

    let mut sums = vec![(0.0, 0_usize); buckets.num_buckets()];
    for (&value, &key) in values.iter().zip(keys) {
        if value.is_nan() {
            continue;
        }
        if let Some(index) = buckets.bucket_of(key) {
            let (sum, count) = &mut sums[index];
            *sum += value;
            *count += 1;
        }
    }

    let summaries = sums
        .into_iter()
        .zip(&buckets.weights)
        .zip(buckets.ranges())
        .map(|(((sum, count), &weight), range)| {
            let mean = if count == 0 {
                tracing::warn!(bucket = %range, "empty bucket, its mean is NaN");
                f64::NAN
            } else {
                sum / count as f64
            };
            BucketSummary {
                range,
                weight,
                count,
                mean,
            }
        })
        .collect();
    Ok(summaries)
}

/// `sum(bucket_mean_i * weight_i / 100)` over every bucket of `buckets`.
///
/// Returns `NaN` when any bucket is empty (see the module docs).
///
/// # Errors
///
/// [`ScoreError::LengthMismatch`] when `values` and `keys` differ in length.
pub fn weighted_bucket_average(
    values: &[f64],
    keys: &[f64],
    buckets: &BucketSpec,
) -> Result<f64, ScoreError> {
    let summaries = bucket_summaries(values, keys, buckets)?;
    Ok(summaries.iter().map(BucketSummary::contribution).sum())
}

/// Whole days from each timestamp to `reference`, rounded down.
///
/// Timestamps after `reference` give negative values.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn elapsed_days(timestamps: &[NaiveDateTime], reference: NaiveDateTime) -> Vec<f64> {
    const SECONDS_PER_DAY: i64 = 86_400;
    timestamps
        .iter()
        .map(|ts| {
            let seconds = (reference - *ts).num_seconds();
            seconds.div_euclid(SECONDS_PER_DAY) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_single_bucket_is_plain_mean() {
        let values = [4.0, 5.0, 2.5, 3.5];
        let keys = [0.0, 100.0, -3.0, 7.0];
        let avg = weighted_bucket_average(&values, &keys, &BucketSpec::single(100.0)).unwrap();
        assert_abs_diff_eq!(avg, 3.75, epsilon = 1e-12);
    }

    #[test]
    fn test_edges_belong_to_lower_bucket() {
        let spec = BucketSpec::time_default();
        assert_eq!(spec.bucket_of(30.0), Some(0));
        assert_eq!(spec.bucket_of(30.5), Some(1));
        assert_eq!(spec.bucket_of(90.0), Some(1));
        assert_eq!(spec.bucket_of(180.0), Some(2));
        assert_eq!(spec.bucket_of(181.0), Some(3));
        assert_eq!(spec.bucket_of(-1.0), Some(0));
        assert_eq!(spec.bucket_of(f64::NAN), None);
    }

    #[test]
    fn test_time_default_weighting() {
        let values = [5.0, 4.0, 3.0, 2.0, 4.0];
        let keys = [10.0, 60.0, 120.0, 400.0, 200.0];
        let avg = weighted_bucket_average(&values, &keys, &BucketSpec::time_default()).unwrap();
        // 5 * .28 + 4 * .26 + 3 * .24 + 3 * .22
        assert_abs_diff_eq!(avg, 3.82, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_bucket_propagates_nan() {
        let values = [5.0, 4.0];
        let keys = [5.0, 30.0];
        let summaries = bucket_summaries(&values, &keys, &BucketSpec::progress_default()).unwrap();
        assert_eq!(
            summaries.iter().map(|s| s.count).collect::<Vec<_>>(),
            [1, 1, 0, 0]
        );
        assert!(summaries[2].mean.is_nan());
        let avg =
            weighted_bucket_average(&values, &keys, &BucketSpec::progress_default()).unwrap();
        assert!(avg.is_nan());
    }

    #[test]
    fn test_nan_values_are_skipped() {
        let values = [f64::NAN, 2.0, 4.0];
        let keys = [1.0, 2.0, 3.0];
        let avg = weighted_bucket_average(&values, &keys, &BucketSpec::single(100.0)).unwrap();
        assert_abs_diff_eq!(avg, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            weighted_bucket_average(&[1.0], &[], &BucketSpec::short_time()),
            Err(ScoreError::LengthMismatch { left: 1, right: 0 })
        );
    }

    #[test]
    fn test_invalid_specs() {
        assert_eq!(
            BucketSpec::new(vec![10.0, 10.0], vec![1.0, 1.0, 1.0]),
            Err(ScoreError::InvalidBucketSpec)
        );
        assert_eq!(
            BucketSpec::new(vec![10.0], vec![1.0]),
            Err(ScoreError::InvalidBucketSpec)
        );
        assert_eq!(
            BucketSpec::new(vec![f64::INFINITY], vec![1.0, 1.0]),
            Err(ScoreError::InvalidBucketSpec)
        );
    }

    #[test]
    fn test_range_display() {
        let spec = BucketSpec::short_time();
        let labels = spec.ranges().map(|r| r.to_string()).collect::<Vec<_>>();
        assert_eq!(labels, ["<= 30", "(30, 60]", "> 60"]);
        let single = BucketSpec::single(100.0);
        assert_eq!(single.range(0).unwrap().to_string(), "all");
    }

    #[test]
    fn test_range_past_last_bucket() {
        let spec = BucketSpec::short_time();
        assert_eq!(
            spec.range(2),
            Some(BucketRange {
                lower: Some(60.0),
                upper: None,
            })
        );
        assert_eq!(spec.range(3), None);
        assert_eq!(BucketSpec::single(100.0).range(1), None);
    }

    #[test]
    fn test_elapsed_days_floors() {
        let reference = at(2021, 2, 10, 0);
        let days = elapsed_days(
            &[at(2021, 2, 9, 23), at(2021, 1, 11, 0), at(2020, 2, 10, 12), at(2021, 2, 11, 0)],
            reference,
        );
        assert_eq!(days, vec![0.0, 30.0, 365.0, -1.0]);
    }

    #[test]
    fn test_deserialize_validates() {
        let spec: BucketSpec =
            serde_json::from_str(r#"{"boundaries":[30,60],"weights":[30,35,35]}"#).unwrap();
        assert_eq!(spec, BucketSpec::short_time());
        assert!(
            serde_json::from_str::<BucketSpec>(r#"{"boundaries":[60,30],"weights":[1,1,1]}"#)
                .is_err()
        );
    }
}
