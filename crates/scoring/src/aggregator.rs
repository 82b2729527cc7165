//! Reduction of raw per-judge scores into a single criterion value, and of
//! per-criterion values into a submission's weighted final score.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Arithmetic mean of `scores`. An empty slice aggregates to zero.
pub fn mean(scores: &[Decimal]) -> Decimal {
    if scores.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = scores.iter().sum();
    sum / Decimal::from(scores.len() as u64)
}

/// Trimmed mean: with fewer than three scores this falls back to [`mean`].
/// Otherwise the single highest and single lowest value are dropped
/// (regardless of how many scores tie at the extremes) and the remainder is
/// averaged.
pub fn trimmed_mean(scores: &[Decimal]) -> Decimal {
    if scores.len() < 3 {
        return mean(scores);
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let trimmed = &sorted[1..sorted.len() - 1];
    mean(trimmed)
}

/// The two supported criterion-aggregation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Mean,
    TrimmedMean,
}

impl AggregationMethod {
    pub fn aggregate(self, scores: &[Decimal]) -> Decimal {
        match self {
            AggregationMethod::Mean => mean(scores),
            AggregationMethod::TrimmedMean => trimmed_mean(scores),
        }
    }
}

/// A single criterion's contribution to a submission's final score: its
/// aggregated value, its configured weight, and how many judges scored it.
#[derive(Debug, Clone, Copy)]
pub struct CriterionContribution {
    pub aggregated: Decimal,
    pub weight: Decimal,
    pub judge_count: u32,
}

/// Weighted final score across criteria: `Σ(aggregated · weight) / Σ(weight)`
/// over criteria with at least one judge. Criteria with zero judges are
/// excluded from both sums. An empty input, or a weight sum of zero, yields
/// zero.
pub fn weighted_final_score(contributions: &[CriterionContribution]) -> Decimal {
    let mut weighted_sum = Decimal::ZERO;
    let mut weight_sum = Decimal::ZERO;

    for c in contributions.iter().filter(|c| c.judge_count > 0) {
        weighted_sum += c.aggregated * c.weight;
        weight_sum += c.weight;
    }

    if weight_sum.is_zero() {
        return Decimal::ZERO;
    }
    weighted_sum / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), Decimal::ZERO);
    }

    #[test]
    fn mean_is_arithmetic_average() {
        let scores = vec![dec!(1), dec!(5), dec!(6), dec!(7), dec!(8), dec!(9)];
        assert_eq!(mean(&scores), dec!(6));
    }

    #[test]
    fn trimmed_mean_falls_back_below_three() {
        let scores = vec![dec!(4), dec!(8)];
        assert_eq!(trimmed_mean(&scores), dec!(6));
    }

    #[test]
    fn trimmed_mean_drops_extremes() {
        // spec example: [1,5,6,7,8,9] -> drop 1 and 9, mean of [5,6,7,8] = 6.5
        let scores = vec![dec!(1), dec!(5), dec!(6), dec!(7), dec!(8), dec!(9)];
        assert_eq!(trimmed_mean(&scores), dec!(6.5));
    }

    #[test]
    fn trimmed_mean_trims_only_one_extreme_each_side_on_ties() {
        let scores = vec![dec!(5), dec!(5), dec!(5), dec!(5)];
        assert_eq!(trimmed_mean(&scores), dec!(5));
    }

    #[test]
    fn weighted_final_score_example() {
        // criterion A weight 1 score 6, criterion B weight 2 score 9 -> 8.0
        let contributions = vec![
            CriterionContribution { aggregated: dec!(6), weight: dec!(1), judge_count: 1 },
            CriterionContribution { aggregated: dec!(9), weight: dec!(2), judge_count: 1 },
        ];
        assert_eq!(weighted_final_score(&contributions), dec!(8));
    }

    #[test]
    fn weighted_final_score_ignores_zero_judge_criteria() {
        let base = vec![CriterionContribution {
            aggregated: dec!(6),
            weight: dec!(1),
            judge_count: 1,
        }];
        let with_unscored = {
            let mut v = base.clone();
            v.push(CriterionContribution {
                aggregated: Decimal::ZERO,
                weight: dec!(5),
                judge_count: 0,
            });
            v
        };
        assert_eq!(weighted_final_score(&base), weighted_final_score(&with_unscored));
    }

    #[test]
    fn weighted_final_score_of_empty_is_zero() {
        assert_eq!(weighted_final_score(&[]), Decimal::ZERO);
    }

    #[test]
    fn weighted_final_score_zero_weight_sum_is_zero() {
        let contributions = vec![CriterionContribution {
            aggregated: dec!(6),
            weight: Decimal::ZERO,
            judge_count: 1,
        }];
        assert_eq!(weighted_final_score(&contributions), Decimal::ZERO);
    }
}
