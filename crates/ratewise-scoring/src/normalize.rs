//! Min-max rescaling of a numeric column into a target range.

use serde::{Deserialize, Serialize};

use crate::ScoreError;

/// Closed target interval for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Rescales `values` linearly so the column minimum maps to `target_min`
/// and the column maximum maps to `target_max`.
///
/// The range is taken over the finite values of the whole column. Non-finite
/// entries are ignored when finding it and come out as `NaN`, so every
/// number in the output lies within the target range.
///
/// # Errors
///
/// * [`ScoreError::EmptyInput`] - no finite value to take the range from
/// * [`ScoreError::DegenerateRange`] - every value is the same, so the
///   column carries no spread to rescale
///
/// # Examples
///
/// ```
/// use ratewise_scoring::normalize::normalize;
///
/// let scaled = normalize(&[10.0, 20.0, 30.0], 1.0, 10.0).unwrap();
/// assert_eq!(scaled, vec![1.0, 5.5, 10.0]);
/// ```
pub fn normalize(values: &[f64], target_min: f64, target_max: f64) -> Result<Vec<f64>, ScoreError> {
    let (source_min, source_max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |range: Option<(f64, f64)>, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(ScoreError::EmptyInput)?;

    let span = source_max - source_min;
    if span <= 0.0 {
        return Err(ScoreError::DegenerateRange { value: source_min });
    }

    let target_span = target_max - target_min;
    Ok(values
        .iter()
        .map(|v| {
            if !v.is_finite() {
                f64::NAN
            } else if v.total_cmp(&source_max).is_eq() {
                // exact upper bound regardless of rounding
                target_max
            } else {
                target_min + (v - source_min) * target_span / span
            }
        })
        .collect())
}

/// [`normalize`] into a [`ScaleRange`].
pub fn normalize_into(values: &[f64], range: ScaleRange) -> Result<Vec<f64>, ScoreError> {
    normalize(values, range.min, range.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_extremes_exactly() {
        let values = [3.7, -2.1, 8.25, 0.0, 8.25, 1.3];
        let scaled = normalize(&values, 1.0, 5.0).unwrap();
        assert_eq!(scaled[1], 1.0);
        assert_eq!(scaled[2], 5.0);
        assert_eq!(scaled[4], 5.0);
        assert!(scaled.iter().all(|v| (1.0..=5.0).contains(v)));
    }

    #[test]
    fn test_spec_example() {
        assert_eq!(
            normalize(&[10.0, 20.0, 30.0], 1.0, 10.0).unwrap(),
            vec![1.0, 5.5, 10.0]
        );
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        assert_eq!(
            normalize(&[4.0, 4.0, 4.0], 1.0, 10.0),
            Err(ScoreError::DegenerateRange { value: 4.0 })
        );
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(normalize(&[], 1.0, 10.0), Err(ScoreError::EmptyInput));
        assert_eq!(
            normalize(&[f64::NAN], 1.0, 10.0),
            Err(ScoreError::EmptyInput)
        );
    }

    #[test]
    fn test_nan_passes_through() {
        let scaled = normalize(&[0.0, f64::NAN, 2.0], 0.0, 1.0).unwrap();
        assert_eq!(scaled[0], 0.0);
        assert!(scaled[1].is_nan());
        assert_eq!(scaled[2], 1.0);
    }

    #[test]
    fn test_infinities_become_nan() {
        let scaled = normalize(&[f64::INFINITY, 0.0, 4.0, f64::NEG_INFINITY], 1.0, 5.0).unwrap();
        assert!(scaled[0].is_nan());
        assert_eq!(&scaled[1..3], [1.0, 5.0]);
        assert!(scaled[3].is_nan());
    }

    #[test]
    fn test_reversed_target_range() {
        let scaled = normalize_into(&[0.0, 5.0, 10.0], ScaleRange::new(1.0, 0.0)).unwrap();
        assert_eq!(scaled, vec![1.0, 0.5, 0.0]);
    }
}
