//! Shapiro-Wilk test for normality.
//!
//! The W statistic is computed with Royston's (1992, 1995) polynomial
//! approximation of the Shapiro-Wilk coefficients (algorithm AS R94), and the
//! p-value with Royston's normalizing transformation of `ln(1 - W)`.
//!
//! # Examples
//!
//! ```
//! use ratewise_stats::normality::shapiro_wilk;
//!
//! let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
//! let result = shapiro_wilk(&data).unwrap();
//! assert!(result.statistic > 0.9);
//! assert!(result.p_value > 0.05); // cannot reject normality
//! ```

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::{TestError, ensure_sample, normal};

const TEST_NAME: &str = "Shapiro-Wilk test";

/// Smallest sample the W statistic is defined for.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Largest sample Royston's approximation is calibrated for.
pub const MAX_CALIBRATED_SIZE: usize = 5000;

/// Outcome of a normality test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTest {
    /// The W statistic, in `(0, 1]`.
    pub statistic: f64,
    /// Probability of a W at least this small under normality.
    pub p_value: f64,
}

// Royston polynomial coefficients (AS R94)
const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_19, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

/// Runs the Shapiro-Wilk test on `sample`.
///
/// # Errors
///
/// * [`TestError::InsufficientSample`] - fewer than three observations
/// * [`TestError::NonFiniteValue`] - the sample contains `NaN` or an infinity
/// * [`TestError::Undefined`] - every observation is identical (zero range)
pub fn shapiro_wilk(sample: &[f64]) -> Result<NormalityTest, TestError> {
    ensure_sample(TEST_NAME, sample, MIN_SAMPLE_SIZE)?;

    let n = sample.len();
    if n > MAX_CALIBRATED_SIZE {
        tracing::warn!(
            n,
            "Shapiro-Wilk p-value may be inaccurate above {MAX_CALIBRATED_SIZE} observations"
        );
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if range <= f64::EPSILON * x[0].abs().max(x[n - 1].abs()) {
        return Err(TestError::Undefined {
            test: TEST_NAME,
            reason: "all observations are identical",
        });
    }

    let coefficients = coefficients(n);
    let w = statistic(&x, &coefficients).min(1.0);
    let p_value = p_value(w, n).clamp(0.0, 1.0);

    Ok(NormalityTest {
        statistic: w,
        p_value,
    })
}

// Evaluates c[0] + c[1]*x + c[2]*x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

// Antisymmetric weights a_1..a_{n/2} applied to the sorted sample.
#[expect(clippy::cast_precision_loss)]
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let nf = n as f64;
    // Blom scores for the lower half; negated so that m[0] is the largest
    let m = (1..=half)
        .map(|i| -normal::quantile((i as f64 - 0.375) / (nf + 0.25)))
        .collect::<Vec<_>>();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let mut a = vec![0.0; half];
    a[0] = m[0] / ssumm2 + poly(&C1, rsn);

    let (fixed, fac) = if n > 5 {
        a[1] = m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a[0].powi(2) - 2.0 * a[1].powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a[0].powi(2))).sqrt();
        (1, fac)
    };
    for (ai, mi) in a.iter_mut().zip(&m).skip(fixed) {
        *ai = mi / fac;
    }
    a
}

#[expect(clippy::cast_precision_loss)]
fn statistic(sorted: &[f64], a: &[f64]) -> f64 {
    let n = sorted.len();
    let numerator = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum::<f64>();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    numerator * numerator / ss
}

#[expect(clippy::cast_precision_loss)]
fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        // exact distribution: p = 6/pi * (asin(sqrt(W)) - asin(sqrt(3/4)))
        let w = w.max(0.75);
        return 6.0 / PI * (w.sqrt().asin() - PI / 3.0);
    }

    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (y, mean, sd) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        (-(gamma - y).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };
    normal::sf((y - mean) / sd)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_too_few_observations() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(TestError::InsufficientSample {
                test: TEST_NAME,
                required: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_constant_sample_is_undefined() {
        assert!(matches!(shapiro_wilk(&[5.0; 5]), Err(TestError::Undefined { .. })));
    }

    #[test]
    fn test_small_scale_sample_is_defined() {
        let unit = (1..=10).map(f64::from).collect::<Vec<_>>();
        let tiny = unit.iter().map(|x| 1e-17 * (10.0 + x)).collect::<Vec<_>>();

        let expected = shapiro_wilk(&unit).unwrap();
        let result = shapiro_wilk(&tiny).unwrap();
        assert_abs_diff_eq!(result.statistic, expected.statistic, epsilon = 1e-9);
        assert_abs_diff_eq!(result.p_value, expected.p_value, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_nan() {
        assert_eq!(
            shapiro_wilk(&[1.0, f64::NAN, 3.0]),
            Err(TestError::NonFiniteValue { test: TEST_NAME })
        );
    }

    #[test]
    fn test_three_observations_exact() {
        // Evenly spaced triple is a perfect fit: W = 1, p = 1
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(result.statistic, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_sequence() {
        let data = (1..=10).map(f64::from).collect::<Vec<_>>();
        let result = shapiro_wilk(&data).unwrap();
        assert_abs_diff_eq!(result.statistic, 0.970_158_7, epsilon = 1e-4);
        assert_abs_diff_eq!(result.p_value, 0.892_379_5, epsilon = 1e-3);
    }

    #[test]
    fn test_skewed_sample_rejects_normality() {
        let data = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 50.0, 100.0];
        let result = shapiro_wilk(&data).unwrap();
        assert!(result.p_value < 0.05, "p = {}", result.p_value);
    }
}
