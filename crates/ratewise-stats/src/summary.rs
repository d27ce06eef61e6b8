//! One-call descriptive summary of a column.

use crate::{descriptive::DescriptiveStats, percentiles::Percentiles};

/// Percentile points reported when the caller does not choose any.
pub const DEFAULT_PERCENTILE_POINTS: [f64; 8] = [10.0, 25.0, 50.0, 70.0, 80.0, 90.0, 95.0, 99.0];

/// Descriptive statistics plus requested percentiles of a column.
#[derive(Debug, Clone)]
pub struct Summary {
    pub stats: DescriptiveStats,
    pub percentiles: Percentiles,
}

/// Summarizes the non-`NaN` entries of `values`.
///
/// Returns `None` when nothing is left to summarize.
///
/// # Examples
///
/// ```
/// use ratewise_stats::summary::describe;
///
/// let summary = describe(&[4.0, f64::NAN, 1.0, 3.0, 2.0, 5.0], &[25.0, 50.0]).unwrap();
/// assert_eq!(summary.stats.count, 5);
/// assert_eq!(summary.stats.mean, 3.0);
/// assert_eq!(summary.percentiles.get(25.0), Some(2.0));
/// ```
#[must_use]
pub fn describe(values: &[f64], percentile_points: &[f64]) -> Option<Summary> {
    let mut sorted = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);

    let stats = DescriptiveStats::from_sorted(&sorted)?;
    let percentiles = Percentiles::from_sorted(&sorted, percentile_points);
    Some(Summary { stats, percentiles })
}
