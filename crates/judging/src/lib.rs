//! Seat assignment planning and next-submission lookup for live judging.

pub mod plan;
pub mod service;

pub use plan::{AssignmentPlan, SeatPlan, TablePlan};
pub use service::JudgingService;
