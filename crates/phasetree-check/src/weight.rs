//! Weight validation
//!
//! A weight is a percentage share of the parent's effort. Each weight must
//! lie in 1..=100 and the weights of siblings may not add up to more than the
//! cap. Under-allocation is fine: it represents partially planned scope.

use thiserror::Error;

pub const MIN_WEIGHT: i64 = 1;
pub const MAX_WEIGHT: i64 = 100;
pub const DEFAULT_WEIGHT_CAP: i64 = 100;

/// Problem with a single weight value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeightError {
    /// Blank or zero
    #[error("weight is required")]
    Required,

    #[error("weight must be between 1 and 100 (got {0})")]
    OutOfRange(i64),
}

/// Sibling weights exceed the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("weight sum ({sum}) cannot exceed {cap}")]
pub struct WeightSumError {
    pub sum: i64,
    pub cap: i64,
}

/// Check a single weight. Zero counts as missing.
pub fn validate_weight(value: Option<i64>) -> Result<(), WeightError> {
    match value {
        None | Some(0) => Err(WeightError::Required),
        Some(w) if (MIN_WEIGHT..=MAX_WEIGHT).contains(&w) => Ok(()),
        Some(w) => Err(WeightError::OutOfRange(w)),
    }
}

/// Check that sibling weights stay within `cap`.
///
/// Missing weights contribute 0; a sum of exactly `cap` is valid.
pub fn validate_weight_sum<I>(weights: I, cap: i64) -> Result<(), WeightSumError>
where
    I: IntoIterator<Item = Option<i64>>,
{
    let sum = weights
        .into_iter()
        .fold(0i64, |acc, w| acc.saturating_add(w.unwrap_or(0)));

    if sum > cap {
        Err(WeightSumError { sum, cap })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_in_range_is_valid() {
        for w in [1, 2, 50, 99, 100] {
            assert_eq!(validate_weight(Some(w)), Ok(()), "weight {w}");
        }
    }

    #[test]
    fn weight_valid_iff_between_1_and_100() {
        for w in -150..=250 {
            assert_eq!(
                validate_weight(Some(w)).is_ok(),
                (1..=100).contains(&w),
                "weight {w}"
            );
        }
    }

    #[test]
    fn missing_or_zero_weight_is_required() {
        assert_eq!(validate_weight(None), Err(WeightError::Required));
        assert_eq!(validate_weight(Some(0)), Err(WeightError::Required));
    }

    #[test]
    fn out_of_range_weights() {
        assert_eq!(validate_weight(Some(-5)), Err(WeightError::OutOfRange(-5)));
        assert_eq!(validate_weight(Some(101)), Err(WeightError::OutOfRange(101)));
    }

    #[test]
    fn sum_at_cap_is_valid() {
        assert!(validate_weight_sum([Some(60), Some(40)], 100).is_ok());
        assert!(validate_weight_sum([Some(100)], 100).is_ok());
    }

    #[test]
    fn sum_below_cap_is_valid() {
        assert!(validate_weight_sum([Some(10), Some(20)], 100).is_ok());
        assert!(validate_weight_sum([Some(0)], 100).is_ok());
        assert!(validate_weight_sum([], 100).is_ok());
    }

    #[test]
    fn sum_over_cap_reports_sum_and_cap() {
        let err = validate_weight_sum([Some(60), Some(50)], 100).unwrap_err();
        assert_eq!(err, WeightSumError { sum: 110, cap: 100 });
        assert_eq!(err.to_string(), "weight sum (110) cannot exceed 100");
    }

    #[test]
    fn missing_weights_count_as_zero() {
        assert!(validate_weight_sum([Some(100), None, None], 100).is_ok());
        assert!(validate_weight_sum([Some(60), None, Some(41)], 100).is_err());
    }

    #[test]
    fn custom_cap() {
        assert!(validate_weight_sum([Some(30), Some(30)], 50).is_err());
        assert!(validate_weight_sum([Some(30), Some(20)], 50).is_ok());
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let err = validate_weight_sum([Some(i64::MAX), Some(1)], 100).unwrap_err();
        assert_eq!(err.sum, i64::MAX);
    }
}
