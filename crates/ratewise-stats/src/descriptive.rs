/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency, dispersion,
/// and spread for a dataset of `f64` values. Dispersion uses the sample
/// (`n - 1`) denominator, matching what the two-sample tests in
/// [`crate::two_sample`] expect.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset (midpoint of the two central values for even counts).
    pub median: f64,
    /// The sample variance of the dataset (`NaN` for a single value).
    pub variance: f64,
    /// The sample standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    /// `NaN` values are skipped.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one non-`NaN` value
    /// * `None` - otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// # use ratewise_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// Use this when you already have sorted data to avoid unnecessary work.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let mean = mean(sorted_values)?;
        let variance = sample_variance(sorted_values).unwrap_or(f64::NAN);

        Some(Self {
            count,
            min,
            max,
            mean,
            median: median_of_sorted(sorted_values)?,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Arithmetic mean, or `None` for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with the `n - 1` denominator.
///
/// Returns `None` for fewer than two values.
///
/// ```
/// # use ratewise_stats::descriptive::sample_variance;
/// assert_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(2.5));
/// assert_eq!(sample_variance(&[1.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(ss / (values.len() - 1) as f64)
}

/// Median of unsorted values, or `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_of_sorted(&sorted)
}

fn median_of_sorted(sorted_values: &[f64]) -> Option<f64> {
    let n = sorted_values.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted_values[n / 2])
    } else {
        Some(f64::midpoint(sorted_values[n / 2 - 1], sorted_values[n / 2]))
    }
}
