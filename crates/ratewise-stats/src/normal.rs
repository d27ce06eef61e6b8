//! Standard normal distribution helpers.
//!
//! Thin wrappers over the complementary error function so callers can
//! work with z-scores without constructing a distribution object.

use std::f64::consts::SQRT_2;

use statrs::function::erf;

/// Cumulative distribution function of the standard normal distribution.
///
/// ```
/// # use ratewise_stats::normal::cdf;
/// assert!((cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!(cdf(1.96) > 0.975 && cdf(1.96) < 0.9751);
/// ```
#[must_use]
pub fn cdf(z: f64) -> f64 {
    0.5 * erf::erfc(-z / SQRT_2)
}

/// Upper tail probability `P(Z > z)` of the standard normal distribution.
#[must_use]
pub fn sf(z: f64) -> f64 {
    0.5 * erf::erfc(z / SQRT_2)
}

/// Inverse CDF (quantile function) of the standard normal distribution.
///
/// `p` must lie in the open interval `(0, 1)`; the bounds map to infinities.
///
/// ```
/// # use ratewise_stats::normal::quantile;
/// let z = quantile(0.975);
/// assert!((z - 1.959_963_984_540_054).abs() < 1e-9);
/// ```
#[must_use]
pub fn quantile(p: f64) -> f64 {
    -SQRT_2 * erf::erfc_inv(2.0 * p)
}

/// Two-sided critical z-value for a confidence level, e.g. `1.96` for `0.95`.
#[must_use]
pub fn two_sided_z(confidence_level: f64) -> f64 {
    quantile(1.0 - (1.0 - confidence_level) / 2.0)
}
