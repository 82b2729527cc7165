//! Deterministic per-seat passing-order sequences.
//!
//! Models the physical tray-passing pattern at a judging table: batches enter
//! at a designated seat and move clockwise; "upstream" seats see fresh
//! incoming samples first, "downstream" seats see batch-1 completions first.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("seat_number {seat_number} is outside [1, {seat_count}]")]
    InvalidSeatNumber { seat_number: u32, seat_count: u32 },
}

/// Generate the length-`min(submission_count, submission_count)` sequence of
/// submission numbers (1-indexed) that `seat_number` evaluates, in order.
///
/// `seat_number` and `seat_count` are both 1-indexed; `seat_number` must lie
/// in `[1, seat_count]`.
pub fn generate_seat_sequence(
    seat_number: u32,
    submission_count: u32,
    seat_count: u32,
) -> Result<Vec<u32>, SequenceError> {
    if seat_number < 1 || seat_number > seat_count {
        return Err(SequenceError::InvalidSeatNumber {
            seat_number,
            seat_count,
        });
    }

    if submission_count == 0 {
        return Ok(Vec::new());
    }

    let k = seat_number;
    let n = submission_count;
    let s = seat_count;

    if n <= s {
        let mut seq = Vec::with_capacity(n as usize);
        if k <= n {
            seq.push(k);
        }
        let mut rest: Vec<u32> = (1..=n).filter(|&x| x != k).collect();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        seq.extend(rest);
        return Ok(seq);
    }

    let extras: Vec<u32> = ((s + 1)..=n).collect();
    let mut batch1_others: Vec<u32> = (1..=s).filter(|&x| x != k).collect();
    batch1_others.sort_unstable_by(|a, b| b.cmp(a));

    let midpoint = s.div_ceil(2);

    let mut seq = Vec::with_capacity(n as usize);
    seq.push(k);
    if k <= midpoint {
        seq.extend(extras);
        seq.extend(batch1_others);
    } else {
        seq.extend(batch1_others);
        seq.extend(extras.into_iter().rev());
    }
    Ok(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn spec_example_seat_1_of_6_with_15_submissions() {
        let seq = generate_seat_sequence(1, 15, 6).unwrap();
        assert_eq!(seq, vec![1, 7, 8, 9, 10, 11, 12, 13, 14, 15, 6, 5, 4, 3, 2]);
    }

    #[test]
    fn spec_example_seat_6_of_6_with_15_submissions() {
        let seq = generate_seat_sequence(6, 15, 6).unwrap();
        assert_eq!(seq, vec![6, 5, 4, 3, 2, 1, 15, 14, 13, 12, 11, 10, 9, 8, 7]);
    }

    #[test]
    fn invalid_seat_number_errors() {
        assert!(generate_seat_sequence(0, 10, 6).is_err());
        assert!(generate_seat_sequence(7, 10, 6).is_err());
    }

    #[test]
    fn zero_submissions_is_empty() {
        assert_eq!(generate_seat_sequence(1, 0, 6).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn n_less_than_s_starts_with_self_then_descending() {
        // N=3, S=6, k=2: self first, then remaining {1,3} descending.
        assert_eq!(generate_seat_sequence(2, 3, 6).unwrap(), vec![2, 3, 1]);
    }

    #[test]
    fn n_less_than_s_without_self_entry() {
        // N=3, S=6, k=5 (k > N): no self entry, remaining {1,2,3} descending.
        assert_eq!(generate_seat_sequence(5, 3, 6).unwrap(), vec![3, 2, 1]);
    }

    proptest::proptest! {
        #[test]
        fn completeness_and_determinism(
            seat_count in 1u32..12,
            submission_count in 0u32..40,
        ) {
            for seat_number in 1..=seat_count {
                let first = generate_seat_sequence(seat_number, submission_count, seat_count).unwrap();
                let second = generate_seat_sequence(seat_number, submission_count, seat_count).unwrap();
                proptest::prop_assert_eq!(&first, &second, "determinism");

                proptest::prop_assert_eq!(first.len() as u32, submission_count);

                let unique: HashSet<u32> = first.iter().copied().collect();
                proptest::prop_assert_eq!(unique.len() as u32, submission_count);
                if submission_count > 0 {
                    proptest::prop_assert_eq!(*first.iter().max().unwrap(), submission_count);
                    proptest::prop_assert_eq!(*first.iter().min().unwrap(), 1);
                }
            }
        }
    }
}
