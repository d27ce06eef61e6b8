//! Two-sample hypothesis tests.
//!
//! All tests are two-sided and compare a `control` sample against a `test`
//! sample:
//!
//! - [`levene`]: equality of variances (median-centred, Brown-Forsythe variant)
//! - [`student_t`]: equality of means assuming equal variances (pooled)
//! - [`welch_t`]: equality of means without the equal-variance assumption
//! - [`mann_whitney_u`]: rank-based location test, no normality assumption
//!
//! # Examples
//!
//! ```
//! use ratewise_stats::two_sample::{levene, mann_whitney_u};
//!
//! let tight = [4.9, 5.0, 5.0, 5.1, 5.0];
//! let wide = [0.0, 3.0, 5.0, 7.0, 10.0];
//! assert!(levene(&tight, &wide).unwrap().p_value < 0.05);
//!
//! let low = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let high = [6.0, 7.0, 8.0, 9.0, 10.0];
//! assert!(mann_whitney_u(&low, &high).unwrap().p_value < 0.01);
//! ```

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::{
    TestError,
    descriptive::{mean, median, sample_variance},
    ensure_sample, normal,
};

/// Outcome of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTest {
    /// Test statistic: F for Levene, t for the t-tests, U of the control sample for Mann-Whitney.
    pub statistic: f64,
    /// Degrees of freedom, where the reference distribution has them.
    pub df: Option<f64>,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Method used to obtain a Mann-Whitney p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMethod {
    /// Exact null distribution of U (small samples without ties).
    Exact,
    /// Normal approximation with tie and continuity correction.
    Asymptotic,
}

/// Largest sample size for which an exact Mann-Whitney p-value is computed.
pub const EXACT_RANK_LIMIT: usize = 8;

const LEVENE: &str = "Levene test";
const STUDENT_T: &str = "Student's t-test";
const WELCH_T: &str = "Welch's t-test";
const MANN_WHITNEY: &str = "Mann-Whitney U test";

/// Levene's test for equal variances, centred on each group's median.
///
/// Applies a one-way ANOVA to the absolute deviations from the group medians;
/// the statistic follows `F(1, n1 + n2 - 2)` under equal variances.
///
/// When the within-group spread of the deviations vanishes relative to the
/// total spread, the statistic is `+inf` with `p = 0` if the groups still
/// differ, and `0` with `p = 1` if they do not.
pub fn levene(control: &[f64], test: &[f64]) -> Result<TwoSampleTest, TestError> {
    ensure_sample(LEVENE, control, 2)?;
    ensure_sample(LEVENE, test, 2)?;

    let deviations = [control, test].map(|group| {
        let center = median(group).unwrap_or(0.0);
        group.iter().map(|x| (x - center).abs()).collect::<Vec<_>>()
    });
    let df_between = 1.0;
    let df_within = count(control) + count(test) - 2.0;

    let group_means = deviations.each_ref().map(|z| mean(z).unwrap_or(0.0));
    let grand_mean = deviations.iter().flatten().sum::<f64>() / (df_within + 2.0);

    let ss_between = deviations
        .iter()
        .zip(group_means)
        .map(|(z, m)| count(z) * (m - grand_mean).powi(2))
        .sum::<f64>();
    let ss_within = deviations
        .iter()
        .zip(group_means)
        .map(|(z, m)| z.iter().map(|v| (v - m).powi(2)).sum::<f64>())
        .sum::<f64>();

    let (statistic, p_value) = if ss_within <= f64::EPSILON * (ss_within + ss_between) {
        if ss_between > 0.0 {
            (f64::INFINITY, 0.0)
        } else {
            (0.0, 1.0)
        }
    } else {
        let f = (ss_between / df_between) / (ss_within / df_within);
        let dist = FisherSnedecor::new(df_between, df_within).map_err(|_| TestError::Undefined {
            test: LEVENE,
            reason: "invalid F distribution parameters",
        })?;
        (f, dist.sf(f))
    };

    Ok(TwoSampleTest {
        statistic,
        df: Some(df_within),
        p_value,
    })
}

/// Independent two-sample t-test with pooled variance (equal variances assumed).
///
/// ```
/// # use ratewise_stats::two_sample::student_t;
/// let r = student_t(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
/// assert_eq!(r.df, Some(8.0));
/// assert!((r.p_value - 0.001_052_8).abs() < 1e-6);
/// ```
pub fn student_t(control: &[f64], test: &[f64]) -> Result<TwoSampleTest, TestError> {
    let (m1, v1, n1) = moments(STUDENT_T, control)?;
    let (m2, v2, n2) = moments(STUDENT_T, test)?;

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    t_outcome(STUDENT_T, m1 - m2, se, df)
}

/// Welch's unequal-variance t-test with Welch-Satterthwaite degrees of freedom.
pub fn welch_t(control: &[f64], test: &[f64]) -> Result<TwoSampleTest, TestError> {
    let (m1, v1, n1) = moments(WELCH_T, control)?;
    let (m2, v2, n2) = moments(WELCH_T, test)?;

    let s1 = v1 / n1;
    let s2 = v2 / n2;
    let df = (s1 + s2).powi(2) / (s1.powi(2) / (n1 - 1.0) + s2.powi(2) / (n2 - 1.0));
    t_outcome(WELCH_T, m1 - m2, (s1 + s2).sqrt(), df)
}

/// Mann-Whitney U test (two-sided).
///
/// The reported statistic is U of the control sample. The p-value comes from
/// the exact null distribution when either sample has at most
/// [`EXACT_RANK_LIMIT`] observations and there are no ties, otherwise from
/// the normal approximation with tie and continuity corrections. When every
/// observation is tied the samples carry no evidence of a shift and the
/// p-value is `1`.
pub fn mann_whitney_u(control: &[f64], test: &[f64]) -> Result<TwoSampleTest, TestError> {
    mann_whitney_u_with_method(control, test).map(|(outcome, _)| outcome)
}

/// Like [`mann_whitney_u`], also reporting which p-value method was used.
pub fn mann_whitney_u_with_method(
    control: &[f64],
    test: &[f64],
) -> Result<(TwoSampleTest, RankMethod), TestError> {
    ensure_sample(MANN_WHITNEY, control, 1)?;
    ensure_sample(MANN_WHITNEY, test, 1)?;

    let mut combined = control
        .iter()
        .map(|&v| (v, true))
        .chain(test.iter().map(|&v| (v, false)))
        .collect::<Vec<_>>();
    combined.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (ranks, tie_term) = average_ranks(&combined);
    let rank_sum = combined
        .iter()
        .zip(&ranks)
        .filter(|((_, is_control), _)| *is_control)
        .map(|(_, rank)| rank)
        .sum::<f64>();

    let n1 = count(control);
    let n2 = count(test);
    let u1 = rank_sum - n1 * (n1 + 1.0) / 2.0;
    let u = u1.max(n1 * n2 - u1);

    let small = control.len().min(test.len()) <= EXACT_RANK_LIMIT;
    let method = if small && tie_term <= 0.0 {
        RankMethod::Exact
    } else {
        RankMethod::Asymptotic
    };

    let p_value = match method {
        RankMethod::Exact => 2.0 * exact_upper_tail(control.len(), test.len(), u),
        RankMethod::Asymptotic => {
            let n = n1 + n2;
            let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
            if variance <= 0.0 {
                1.0
            } else {
                2.0 * normal::sf((u - n1 * n2 / 2.0 - 0.5) / variance.sqrt())
            }
        }
    };
    tracing::debug!(u1, ?method, p_value, "Mann-Whitney U");

    Ok((
        TwoSampleTest {
            statistic: u1,
            df: None,
            p_value: p_value.clamp(0.0, 1.0),
        },
        method,
    ))
}

#[expect(clippy::cast_precision_loss)]
fn count(values: &[f64]) -> f64 {
    values.len() as f64
}

fn moments(test: &'static str, sample: &[f64]) -> Result<(f64, f64, f64), TestError> {
    ensure_sample(test, sample, 2)?;
    let mean = mean(sample).unwrap_or(f64::NAN);
    let variance = sample_variance(sample).unwrap_or(f64::NAN);
    Ok((mean, variance, count(sample)))
}

fn t_outcome(
    test: &'static str,
    mean_diff: f64,
    se: f64,
    df: f64,
) -> Result<TwoSampleTest, TestError> {
    if se.is_nan() || se <= 0.0 {
        return Err(TestError::Undefined {
            test,
            reason: "both samples have zero variance",
        });
    }
    let t = mean_diff / se;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| TestError::Undefined {
        test,
        reason: "invalid degrees of freedom",
    })?;
    Ok(TwoSampleTest {
        statistic: t,
        df: Some(df),
        p_value: (2.0 * dist.sf(t.abs())).min(1.0),
    })
}

// Average (mid) ranks of sorted values, plus the tie term sum(t^3 - t).
#[expect(clippy::cast_precision_loss)]
fn average_ranks<T>(sorted: &[(f64, T)]) -> (Vec<f64>, f64) {
    let mut ranks = vec![0.0; sorted.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < sorted.len() {
        let end = sorted[start..]
            .iter()
            .position(|(v, _)| *v != sorted[start].0)
            .map_or(sorted.len(), |offset| start + offset);
        let rank = (start + 1 + end) as f64 / 2.0;
        ranks[start..end].fill(rank);
        let t = (end - start) as f64;
        tie_term += t * t * t - t;
        start = end;
    }
    (ranks, tie_term)
}

// P(U >= u) under H0 for sample sizes m and n, without ties.
//
// The counts of U = 0..=m*n are the coefficients of the Gaussian binomial
// [m + n choose m]_q, built as prod_{i=1..m} (1 - q^(n+i)) / (1 - q^i).
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn exact_upper_tail(m: usize, n: usize, u: f64) -> f64 {
    let (m, n) = (m.min(n), m.max(n));
    let mut counts = vec![0.0_f64; m * n + 1];
    counts[0] = 1.0;
    for i in 1..=m {
        let degree = i * n;
        for k in (n + i..=degree).rev() {
            counts[k] -= counts[k - n - i];
        }
        for k in i..=degree {
            counts[k] += counts[k - i];
        }
    }
    let total = counts.iter().sum::<f64>();
    let from = (u.ceil().max(0.0) as usize).min(counts.len());
    counts[from..].iter().sum::<f64>() / total
}
