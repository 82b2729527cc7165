//! Rank assignment over plain `(id, score)` records. Pure: no entity schema
//! is referenced here, so the same code ranks submissions within a category
//! and teams across an event.

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;

/// Ties within this distance are considered equal for ranking purposes.
pub const RANK_EPSILON: Decimal = Decimal::new(1, 4);

fn nearly_equal(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < RANK_EPSILON
}

/// One entry after rank assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<Id> {
    pub id: Id,
    pub rank: u32,
}

/// Standard competition ranking ("1, 2, 2, 4") by descending `final_score`.
/// Entries within [`RANK_EPSILON`] of the previous entry share its rank.
pub fn rank_by_score<Id: Clone>(entries: &[(Id, Decimal)]) -> Vec<Ranked<Id>> {
    let mut sorted: Vec<(Id, Decimal)> = entries.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut ranks: Vec<u32> = Vec::with_capacity(sorted.len());
    for (i, (_, score)) in sorted.iter().enumerate() {
        let rank = if i == 0 {
            1
        } else if nearly_equal(*score, sorted[i - 1].1) {
            ranks[i - 1]
        } else {
            (i + 1) as u32
        };
        ranks.push(rank);
    }

    sorted
        .into_iter()
        .zip(ranks)
        .map(|((id, _), rank)| Ranked { id, rank })
        .collect()
}

/// A team's accumulated standing across all categories it entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallStanding<Id> {
    pub id: Id,
    pub rank_sum: u32,
    pub total_score: Decimal,
    pub rank: u32,
}

/// Fold per-category `(team_id, category_rank, final_score)` rows into
/// per-team `(rank_sum, total_score)` totals, preserving first-seen order.
pub fn accumulate_rank_sums<Id: Eq + Hash + Clone>(
    category_results: &[(Id, u32, Decimal)],
) -> Vec<(Id, u32, Decimal)> {
    let mut order: Vec<Id> = Vec::new();
    let mut totals: HashMap<Id, (u32, Decimal)> = HashMap::new();

    for (id, rank, score) in category_results {
        let entry = totals.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            (0, Decimal::ZERO)
        });
        entry.0 += rank;
        entry.1 += score;
    }

    order
        .into_iter()
        .map(|id| {
            let (rank_sum, total_score) = totals[&id];
            (id, rank_sum, total_score)
        })
        .collect()
}

/// Overall ranking: ascending by `rank_sum`, then descending by
/// `total_score`. An entry shares the previous entry's rank only when both
/// metrics match (rank_sum exactly, total_score within [`RANK_EPSILON`]).
pub fn rank_overall<Id: Clone>(standings: &[(Id, u32, Decimal)]) -> Vec<OverallStanding<Id>> {
    let mut sorted: Vec<(Id, u32, Decimal)> = standings.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.2.cmp(&a.2)));

    let mut ranks: Vec<u32> = Vec::with_capacity(sorted.len());
    for (i, (_, rank_sum, total_score)) in sorted.iter().enumerate() {
        let rank = if i == 0 {
            1
        } else {
            let (_, prev_rank_sum, prev_total_score) = &sorted[i - 1];
            if rank_sum == prev_rank_sum && nearly_equal(*total_score, *prev_total_score) {
                ranks[i - 1]
            } else {
                (i + 1) as u32
            }
        };
        ranks.push(rank);
    }

    sorted
        .into_iter()
        .zip(ranks)
        .map(|((id, rank_sum, total_score), rank)| OverallStanding {
            id,
            rank_sum,
            total_score,
            rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ranking_with_ties_spec_example() {
        let entries = vec![
            ("a", dec!(9)),
            ("b", dec!(8)),
            ("c", dec!(8)),
            ("d", dec!(7)),
        ];
        let ranked = rank_by_score(&entries);
        let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn higher_score_always_outranks() {
        let entries = vec![("a", dec!(5)), ("b", dec!(10))];
        let ranked = rank_by_score(&entries);
        let a = ranked.iter().find(|r| r.id == "a").unwrap();
        let b = ranked.iter().find(|r| r.id == "b").unwrap();
        assert!(b.rank < a.rank);
    }

    #[test]
    fn overall_rank_sum_tiebreaker_spec_example() {
        // Team X: cat1 score 9 rank 1, cat2 score 6 rank 2 -> rank_sum 3, total 15
        // Team Y: cat1 score 7 rank 2, cat2 score 9 rank 1 -> rank_sum 3, total 16
        let category_results = vec![
            ("X", 1u32, dec!(9)),
            ("X", 2u32, dec!(6)),
            ("Y", 2u32, dec!(7)),
            ("Y", 1u32, dec!(9)),
        ];
        let standings = accumulate_rank_sums(&category_results);
        let overall = rank_overall(&standings);

        let x = overall.iter().find(|o| o.id == "X").unwrap();
        let y = overall.iter().find(|o| o.id == "Y").unwrap();
        assert_eq!(x.rank_sum, 3);
        assert_eq!(y.rank_sum, 3);
        assert_eq!(y.total_score, dec!(16));
        assert_eq!(x.total_score, dec!(15));
        assert_eq!(y.rank, 1);
        assert_eq!(x.rank, 2);
    }

    #[test]
    fn overall_ties_share_rank_only_when_both_metrics_match() {
        let standings = vec![("a", 3u32, dec!(10)), ("b", 3u32, dec!(10)), ("c", 4u32, dec!(10))];
        let overall = rank_overall(&standings);
        let a = overall.iter().find(|o| o.id == "a").unwrap();
        let b = overall.iter().find(|o| o.id == "b").unwrap();
        let c = overall.iter().find(|o| o.id == "c").unwrap();
        assert_eq!(a.rank, b.rank);
        assert_eq!(a.rank, 1);
        assert_eq!(c.rank, 3);
    }

    proptest::proptest! {
        #[test]
        fn monotonicity(a in -1000i64..1000, b in -1000i64..1000) {
            let a = Decimal::from(a);
            let b = Decimal::from(b);
            proptest::prop_assume!((a - b).abs() >= RANK_EPSILON);
            let entries = vec![("a", a), ("b", b)];
            let ranked = rank_by_score(&entries);
            let ra = ranked.iter().find(|r| r.id == "a").unwrap().rank;
            let rb = ranked.iter().find(|r| r.id == "b").unwrap().rank;
            if a > b {
                proptest::prop_assert!(ra < rb);
            } else {
                proptest::prop_assert!(rb < ra);
            }
        }
    }
}
