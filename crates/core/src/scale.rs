//! Scoring scale value object: the (min, max, step) domain a score must lie in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Tolerance used when checking whether a value lands on a step boundary or
/// whether two scores are "tied" for ranking purposes. Mirrors the `1e-4`
/// tolerance named throughout the scoring and ranking rules.
pub const EPSILON: f64 = 1e-4;

/// An event's scoring scale: `min <= value <= max`, values must land on a
/// `step` boundary within [`EPSILON`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScale {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

impl ValueObject for ScoringScale {}

impl ScoringScale {
    /// Construct a scale, enforcing `min < max` and `step > 0`.
    pub fn new(min: Decimal, max: Decimal, step: Decimal) -> Result<Self, DomainError> {
        if min >= max {
            return Err(DomainError::validation(
                "scoring_scale_min must be less than scoring_scale_max",
            ));
        }
        if step <= Decimal::ZERO {
            return Err(DomainError::validation("scoring_scale_step must be > 0"));
        }
        Ok(Self { min, max, step })
    }

    /// Check that `value` lies within `[min, max]` and is step-aligned.
    ///
    /// Step alignment tolerates floating error: `(value - min) / step` must
    /// be within [`EPSILON`] of an integer.
    pub fn validate(&self, value: Decimal) -> Result<(), DomainError> {
        if value < self.min || value > self.max {
            return Err(DomainError::validation(format!(
                "score {value} outside scale [{}, {}]",
                self.min, self.max
            )));
        }

        let steps = (value - self.min) / self.step;
        let nearest = steps.round();
        let diff = (steps - nearest).abs();
        let eps = Decimal::try_from(EPSILON).unwrap_or(Decimal::new(1, 4));
        if diff > eps {
            return Err(DomainError::validation(format!(
                "score {value} is not aligned to step {}",
                self.step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(ScoringScale::new(dec!(10), dec!(0), dec!(1)).is_err());
    }

    #[test]
    fn rejects_nonpositive_step() {
        assert!(ScoringScale::new(dec!(0), dec!(10), dec!(0)).is_err());
    }

    #[test]
    fn accepts_aligned_value() {
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(0.5)).unwrap();
        assert!(scale.validate(dec!(7.5)).is_ok());
    }

    #[test]
    fn rejects_misaligned_value() {
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(0.5)).unwrap();
        assert!(scale.validate(dec!(7.3)).is_err());
    }

    #[test]
    fn rejects_out_of_range_value() {
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(0.5)).unwrap();
        assert!(scale.validate(dec!(10.5)).is_err());
        assert!(scale.validate(dec!(-0.5)).is_err());
    }
}
