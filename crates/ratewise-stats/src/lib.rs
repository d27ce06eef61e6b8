//! Statistical primitives for the ratewise scoring engine.
//!
//! This crate provides the numeric building blocks the scoring and A/B
//! testing layers are assembled from:
//!
//! - **Descriptive statistics**: mean, median, sample variance, min/max
//! - **Percentiles**: linear-interpolated percentile lookup for column summaries
//! - **Normal distribution**: standard normal CDF and quantile (z-scores)
//! - **Normality testing**: Shapiro-Wilk W test (Royston's approximation)
//! - **Two-sample tests**: Levene, Student's t, Welch's t, Mann-Whitney U
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`summary`]: `describe`-style column summary combining the two above
//! - [`normal`]: Standard normal distribution helpers
//! - [`normality`]: Shapiro-Wilk normality test
//! - [`two_sample`]: Variance-homogeneity and location tests on two samples
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use ratewise_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Comparing two samples
//!
//! ```
//! use ratewise_stats::two_sample;
//!
//! let control = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let test = [6.0, 7.0, 8.0, 9.0, 10.0];
//! let outcome = two_sample::student_t(&control, &test).unwrap();
//! assert_eq!(outcome.statistic, -5.0);
//! assert!(outcome.p_value < 0.01);
//! ```

pub mod descriptive;
pub mod normal;
pub mod normality;
pub mod percentiles;
pub mod summary;
pub mod two_sample;

/// Precondition failure of a statistical test.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TestError {
    #[display("{test} requires at least {required} observations per sample, got {actual}")]
    InsufficientSample {
        test: &'static str,
        required: usize,
        actual: usize,
    },
    #[display("{test} received a non-finite observation")]
    NonFiniteValue { test: &'static str },
    #[display("{test} is undefined for the given samples: {reason}")]
    Undefined {
        test: &'static str,
        reason: &'static str,
    },
}

fn ensure_sample(test: &'static str, sample: &[f64], required: usize) -> Result<(), TestError> {
    if sample.len() < required {
        return Err(TestError::InsufficientSample {
            test,
            required,
            actual: sample.len(),
        });
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(TestError::NonFiniteValue { test });
    }
    Ok(())
}
