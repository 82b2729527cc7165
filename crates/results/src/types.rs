//! Plain result types returned by [`crate::ResultsService`]. None of these
//! are persisted; they are recomputed on every call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bbqjudge_core::{CategoryId, CriterionId, SubmissionId, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    None,
    Partial,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion_id: CriterionId,
    pub aggregated: Decimal,
    pub judge_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub submission_id: SubmissionId,
    pub team_id: TeamId,
    pub criteria: Vec<CriterionResult>,
    pub final_score: Decimal,
    pub completion_status: CompletionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSubmission {
    pub submission: SubmissionResult,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category_id: CategoryId,
    pub submissions: Vec<RankedSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedTeamStanding {
    pub team_id: TeamId,
    pub rank_sum: u32,
    pub total_score: Decimal,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    pub categories: Vec<CategoryResult>,
    pub overall: Vec<RankedTeamStanding>,
}
