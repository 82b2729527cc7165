//! Entries core: a Team's Submission into a Category, and the Scores
//! recorded against it by judging seats.

pub mod phase;
pub mod repo;
pub mod score;
pub mod service;
pub mod submission;

pub use phase::Phase;
pub use repo::{ScoreRepository, SubmissionRepository};
pub use score::Score;
pub use service::{CategoryLookup, EntriesService, ScoreEditor};
pub use submission::Submission;
