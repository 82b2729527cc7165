//! `EntriesService`: Submission and Score CRUD, bridging the venue, rubric,
//! and teams crates to enforce the cross-entity invariants that none of
//! them can check alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bbqjudge_core::{
    Aggregate, CategoryId, CriterionId, DomainError, DomainResult, ScoreId, SeatId, SubmissionId, TeamId,
};
use bbqjudge_rubric::CriterionRepository;
use bbqjudge_statusmachine::SubmissionStatus;
use bbqjudge_teams::TeamRepository;
use bbqjudge_venue::EventRepository;

use crate::phase::Phase;
use crate::repo::{ScoreRepository, SubmissionRepository};
use crate::score::{CreateScore, Score, ScoreCommand, UpdateScore};
use crate::submission::{AdvanceSubmission, CreateSubmission, SoftDeleteSubmission, Submission, SubmissionCommand};

/// The identity enforcing "Scores are editable by the originating seat or
/// by an admin; no one else" — `bbqjudge-entries` has no notion of a user
/// role, so the caller supplies which side of that rule it is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEditor {
    Admin,
    Seat(SeatId),
}

/// We need each category's owning event and a bridge from category to its
/// rubric crate; `bbqjudge-entries` depends on `bbqjudge-rubric` for
/// criteria but categories are looked up through this narrow trait so the
/// dependency stays one-directional and easy to fake in tests.
#[async_trait::async_trait]
pub trait CategoryLookup: Send + Sync {
    async fn event_id_for_category(&self, category_id: CategoryId) -> DomainResult<bbqjudge_core::EventId>;
}

pub struct EntriesService {
    events: Arc<dyn EventRepository>,
    teams: Arc<dyn TeamRepository>,
    categories: Arc<dyn CategoryLookup>,
    criteria: Arc<dyn CriterionRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl EntriesService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        teams: Arc<dyn TeamRepository>,
        categories: Arc<dyn CategoryLookup>,
        criteria: Arc<dyn CriterionRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self { events, teams, categories, criteria, submissions, scores }
    }

    pub async fn create_submission(
        &self,
        team_id: TeamId,
        category_id: CategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<Submission> {
        let team = self.teams.find_by_id(team_id, false).await?.ok_or_else(DomainError::not_found)?;
        let category_event_id = self.categories.event_id_for_category(category_id).await?;
        if team.event_id != category_event_id {
            return Err(DomainError::conflict("team and category must share an event"));
        }
        if self.submissions.find_by_team_and_category(team_id, category_id).await?.is_some() {
            return Err(DomainError::conflict("submission already exists for this team and category"));
        }

        let mut submission = Submission::empty(SubmissionId::new());
        let events = submission.handle(&SubmissionCommand::Create(CreateSubmission {
            id: submission.id,
            team_id,
            category_id,
            now,
        }))?;
        for e in &events {
            submission.apply(e);
        }
        self.submissions.create(submission).await
    }

    pub async fn advance_submission(
        &self,
        id: SubmissionId,
        target: SubmissionStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Submission> {
        let mut submission = self.submissions.find_by_id(id, false).await?.ok_or_else(DomainError::not_found)?;
        let events = submission.handle(&SubmissionCommand::Advance(AdvanceSubmission { target, now }))?;
        for e in &events {
            submission.apply(e);
        }
        self.submissions.update(submission).await
    }

    pub async fn get_submission(&self, id: SubmissionId, include_deleted: bool) -> DomainResult<Submission> {
        self.submissions.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_submissions_by_category(
        &self,
        category_id: CategoryId,
        include_deleted: bool,
    ) -> DomainResult<Vec<Submission>> {
        self.submissions.list_by_category(category_id, include_deleted).await
    }

    pub async fn soft_delete_submission(&self, id: SubmissionId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut submission = self.submissions.find_by_id(id, false).await?.ok_or_else(DomainError::not_found)?;
        let events = submission.handle(&SubmissionCommand::SoftDelete(SoftDeleteSubmission { now }))?;
        for e in &events {
            submission.apply(e);
        }
        self.submissions.update(submission).await?;
        Ok(())
    }

    async fn require_scoreable_submission(&self, submission_id: SubmissionId) -> DomainResult<Submission> {
        let submission = self
            .submissions
            .find_by_id(submission_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        match submission.status {
            SubmissionStatus::TurnedIn | SubmissionStatus::BeingJudged | SubmissionStatus::Scored => Ok(submission),
            _ => Err(DomainError::invalid_status_transition(
                "submission must be turned_in, being_judged, or scored to accept scores",
            )),
        }
    }

    async fn event_scale_for_submission(
        &self,
        submission: &Submission,
    ) -> DomainResult<bbqjudge_core::ScoringScale> {
        let event_id = self.categories.event_id_for_category(submission.category_id).await?;
        let event = self.events.find_by_id(event_id, false).await?.ok_or_else(DomainError::not_found)?;
        Ok(event.scale)
    }

    pub async fn create_score(
        &self,
        submission_id: SubmissionId,
        seat_id: SeatId,
        criterion_id: CriterionId,
        phase: Phase,
        score_value: Decimal,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Score> {
        let submission = self.require_scoreable_submission(submission_id).await?;

        self.criteria
            .find_by_id(criterion_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;

        let scale = self.event_scale_for_submission(&submission).await?;
        scale.validate(score_value)?;

        if self
            .scores
            .find_by_submission_seat_criterion(submission_id, seat_id, criterion_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("score already recorded for this submission/seat/criterion"));
        }

        let mut score = Score::empty(ScoreId::new());
        let events = score.handle(&ScoreCommand::Create(CreateScore {
            id: score.id,
            submission_id,
            seat_id,
            criterion_id,
            phase,
            score_value,
            comment,
            now,
        }))?;
        for e in &events {
            score.apply(e);
        }
        self.scores.create(score).await
    }

    pub async fn update_score(
        &self,
        id: ScoreId,
        editor: ScoreEditor,
        score_value: Option<Decimal>,
        comment: Option<Option<String>>,
        now: DateTime<Utc>,
    ) -> DomainResult<Score> {
        let mut score = self.scores.find_by_id(id).await?.ok_or_else(DomainError::not_found)?;
        self.require_editor(&score, editor)?;

        if let Some(value) = score_value {
            let submission = self
                .submissions
                .find_by_id(score.submission_id, false)
                .await?
                .ok_or_else(DomainError::not_found)?;
            let scale = self.event_scale_for_submission(&submission).await?;
            scale.validate(value)?;
        }

        let events = score.handle(&ScoreCommand::Update(UpdateScore { score_value, comment, now }))?;
        for e in &events {
            score.apply(e);
        }
        self.scores.update(score).await
    }

    pub async fn get_score(&self, id: ScoreId) -> DomainResult<Score> {
        self.scores.find_by_id(id).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_scores_by_submission(&self, submission_id: SubmissionId) -> DomainResult<Vec<Score>> {
        self.scores.list_by_submission(submission_id).await
    }

    /// Scores are hard-deleted, never soft-deleted, and only an admin may do it.
    pub async fn hard_delete_score(&self, id: ScoreId, editor: ScoreEditor) -> DomainResult<()> {
        if editor != ScoreEditor::Admin {
            return Err(DomainError::forbidden("only an admin may hard-delete a score"));
        }
        self.scores.find_by_id(id).await?.ok_or_else(DomainError::not_found)?;
        self.scores.hard_delete(id).await
    }

    fn require_editor(&self, score: &Score, editor: ScoreEditor) -> DomainResult<()> {
        match editor {
            ScoreEditor::Admin => Ok(()),
            ScoreEditor::Seat(seat_id) if seat_id == score.seat_id => Ok(()),
            ScoreEditor::Seat(_) => Err(DomainError::forbidden("scores are editable only by the originating seat")),
        }
    }
}
