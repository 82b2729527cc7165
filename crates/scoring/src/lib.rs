//! Criterion score aggregation and submission/team ranking.

pub mod aggregator;
pub mod ranker;

pub use aggregator::{mean, trimmed_mean, AggregationMethod, CriterionContribution, weighted_final_score};
pub use ranker::{accumulate_rank_sums, rank_by_score, rank_overall, OverallStanding, Ranked, RANK_EPSILON};
