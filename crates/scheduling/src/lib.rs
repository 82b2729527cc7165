//! Seat passing-order generation, judging-order shuffling, and table
//! assignment for a judging round.

pub mod assignment;
pub mod sequence;
pub mod shuffle;

pub use assignment::round_robin_assign;
pub use sequence::{generate_seat_sequence, SequenceError};
pub use shuffle::{hash_seed_str, lcg_shuffle, shuffle_with_seed};
