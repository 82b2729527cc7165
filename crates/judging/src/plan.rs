//! Plan types returned by [`crate::JudgingService::generate_assignment_plan`].
//! The plan is a pure view: nothing here is persisted.

use serde::{Deserialize, Serialize};

use bbqjudge_core::{SeatId, SubmissionId, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPlan {
    pub seat_id: SeatId,
    pub seat_number: u32,
    /// The submissions this seat evaluates, in visiting order.
    pub sequence: Vec<SubmissionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePlan {
    pub table_id: TableId,
    pub submissions: Vec<SubmissionId>,
    pub seats: Vec<SeatPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub tables: Vec<TablePlan>,
}
