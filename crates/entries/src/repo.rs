//! Repository abstractions for Submission and Score.

use async_trait::async_trait;

use bbqjudge_core::{CategoryId, CriterionId, DomainResult, ScoreId, SeatId, SubmissionId, TeamId};

use crate::phase::Phase;
use crate::score::Score;
use crate::submission::Submission;

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: Submission) -> DomainResult<Submission>;
    async fn update(&self, submission: Submission) -> DomainResult<Submission>;
    async fn find_by_id(&self, id: SubmissionId, include_deleted: bool) -> DomainResult<Option<Submission>>;
    async fn find_by_team_and_category(
        &self,
        team_id: TeamId,
        category_id: CategoryId,
    ) -> DomainResult<Option<Submission>>;
    async fn list_by_category(&self, category_id: CategoryId, include_deleted: bool) -> DomainResult<Vec<Submission>>;
}

#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn create(&self, score: Score) -> DomainResult<Score>;
    async fn update(&self, score: Score) -> DomainResult<Score>;
    async fn hard_delete(&self, id: ScoreId) -> DomainResult<()>;
    async fn find_by_id(&self, id: ScoreId) -> DomainResult<Option<Score>>;
    async fn find_by_submission_seat_criterion(
        &self,
        submission_id: SubmissionId,
        seat_id: SeatId,
        criterion_id: CriterionId,
    ) -> DomainResult<Option<Score>>;
    async fn list_by_submission(&self, submission_id: SubmissionId) -> DomainResult<Vec<Score>>;
    async fn list_by_seat_and_category(
        &self,
        seat_id: SeatId,
        category_id: CategoryId,
        phase: Phase,
    ) -> DomainResult<Vec<Score>>;
}
