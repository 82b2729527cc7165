//! Postgres-backed repositories for Submission and Score.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use bbqjudge_core::{AggregateRoot, CategoryId, CriterionId, DomainResult, ScoreId, SeatId, SubmissionId, TeamId};
use bbqjudge_entries::phase::Phase;
use bbqjudge_entries::repo::{ScoreRepository, SubmissionRepository};
use bbqjudge_entries::score::Score;
use bbqjudge_entries::submission::Submission;
use bbqjudge_statusmachine::SubmissionStatus;

use crate::error::map_sqlx_error;

fn submission_status_to_str(status: SubmissionStatus) -> &'static str {
    match status {
        SubmissionStatus::Pending => "pending",
        SubmissionStatus::TurnedIn => "turned_in",
        SubmissionStatus::BeingJudged => "being_judged",
        SubmissionStatus::Scored => "scored",
        SubmissionStatus::Finalized => "finalized",
    }
}

fn submission_status_from_str(s: &str) -> SubmissionStatus {
    match s {
        "turned_in" => SubmissionStatus::TurnedIn,
        "being_judged" => SubmissionStatus::BeingJudged,
        "scored" => SubmissionStatus::Scored,
        "finalized" => SubmissionStatus::Finalized,
        _ => SubmissionStatus::Pending,
    }
}

fn phase_to_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Appearance => "appearance",
        Phase::TasteTexture => "taste_texture",
    }
}

fn phase_from_str(s: &str) -> Phase {
    match s {
        "taste_texture" => Phase::TasteTexture,
        _ => Phase::Appearance,
    }
}

fn row_to_submission(row: sqlx::postgres::PgRow) -> Result<Submission, sqlx::Error> {
    Ok(Submission::hydrate(
        SubmissionId::from_uuid(row.try_get("id")?),
        TeamId::from_uuid(row.try_get("team_id")?),
        CategoryId::from_uuid(row.try_get("category_id")?),
        submission_status_from_str(row.try_get::<String, _>("status")?.as_str()),
        row.try_get("turned_in_at")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgSubmissionRepository {
    pool: Arc<PgPool>,
}

impl PgSubmissionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    #[tracing::instrument(skip(self, submission), err)]
    async fn create(&self, submission: Submission) -> DomainResult<Submission> {
        sqlx::query(
            r#"
            INSERT INTO submissions
                (id, team_id, category_id, status, turned_in_at, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(submission.id.as_uuid().to_owned())
        .bind(submission.team_id.as_uuid().to_owned())
        .bind(submission.category_id.as_uuid().to_owned())
        .bind(submission_status_to_str(submission.status))
        .bind(submission.turned_in_at)
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .bind(submission.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("submissions.create", e))?;
        Ok(submission)
    }

    #[tracing::instrument(skip(self, submission), err)]
    async fn update(&self, submission: Submission) -> DomainResult<Submission> {
        sqlx::query(
            r#"
            UPDATE submissions SET
                status = $2, turned_in_at = $3, updated_at = $4, deleted_at = $5, version = $6
            WHERE id = $1
            "#,
        )
        .bind(submission.id.as_uuid().to_owned())
        .bind(submission_status_to_str(submission.status))
        .bind(submission.turned_in_at)
        .bind(submission.updated_at)
        .bind(submission.deleted_at)
        .bind(submission.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("submissions.update", e))?;
        Ok(submission)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: SubmissionId, include_deleted: bool) -> DomainResult<Option<Submission>> {
        let row = sqlx::query("SELECT * FROM submissions WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("submissions.find_by_id", e))?;
        row.map(row_to_submission).transpose().map_err(|e| map_sqlx_error("submissions.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_team_and_category(
        &self,
        team_id: TeamId,
        category_id: CategoryId,
    ) -> DomainResult<Option<Submission>> {
        let row = sqlx::query(
            "SELECT * FROM submissions WHERE team_id = $1 AND category_id = $2 AND deleted_at IS NULL",
        )
        .bind(team_id.as_uuid().to_owned())
        .bind(category_id.as_uuid().to_owned())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("submissions.find_by_team_and_category", e))?;
        row.map(row_to_submission)
            .transpose()
            .map_err(|e| map_sqlx_error("submissions.find_by_team_and_category", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_category(&self, category_id: CategoryId, include_deleted: bool) -> DomainResult<Vec<Submission>> {
        let rows = sqlx::query(
            "SELECT * FROM submissions WHERE category_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY created_at ASC",
        )
        .bind(category_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("submissions.list_by_category", e))?;
        rows.into_iter()
            .map(row_to_submission)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("submissions.list_by_category", e))
    }
}

fn row_to_score(row: sqlx::postgres::PgRow) -> Result<Score, sqlx::Error> {
    Ok(Score::hydrate(
        ScoreId::from_uuid(row.try_get("id")?),
        SubmissionId::from_uuid(row.try_get("submission_id")?),
        SeatId::from_uuid(row.try_get("seat_id")?),
        CriterionId::from_uuid(row.try_get("criterion_id")?),
        phase_from_str(row.try_get::<String, _>("phase")?.as_str()),
        row.try_get::<Decimal, _>("score_value")?,
        row.try_get("comment")?,
        row.try_get("submitted_at")?,
        row.try_get("updated_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgScoreRepository {
    pool: Arc<PgPool>,
}

impl PgScoreRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ScoreRepository for PgScoreRepository {
    #[tracing::instrument(skip(self, score), err)]
    async fn create(&self, score: Score) -> DomainResult<Score> {
        sqlx::query(
            r#"
            INSERT INTO scores
                (id, submission_id, seat_id, criterion_id, phase, score_value, comment, submitted_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(score.id.as_uuid().to_owned())
        .bind(score.submission_id.as_uuid().to_owned())
        .bind(score.seat_id.as_uuid().to_owned())
        .bind(score.criterion_id.as_uuid().to_owned())
        .bind(phase_to_str(score.phase))
        .bind(score.score_value)
        .bind(&score.comment)
        .bind(score.submitted_at)
        .bind(score.updated_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("scores.create", e))?;
        Ok(score)
    }

    #[tracing::instrument(skip(self, score), err)]
    async fn update(&self, score: Score) -> DomainResult<Score> {
        sqlx::query(
            "UPDATE scores SET score_value = $2, comment = $3, updated_at = $4, version = $5 WHERE id = $1",
        )
        .bind(score.id.as_uuid().to_owned())
        .bind(score.score_value)
        .bind(&score.comment)
        .bind(score.updated_at)
        .bind(score.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("scores.update", e))?;
        Ok(score)
    }

    #[tracing::instrument(skip(self), err)]
    async fn hard_delete(&self, id: ScoreId) -> DomainResult<()> {
        sqlx::query("DELETE FROM scores WHERE id = $1")
            .bind(id.as_uuid().to_owned())
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("scores.hard_delete", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: ScoreId) -> DomainResult<Option<Score>> {
        let row = sqlx::query("SELECT * FROM scores WHERE id = $1")
            .bind(id.as_uuid().to_owned())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("scores.find_by_id", e))?;
        row.map(row_to_score).transpose().map_err(|e| map_sqlx_error("scores.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_submission_seat_criterion(
        &self,
        submission_id: SubmissionId,
        seat_id: SeatId,
        criterion_id: CriterionId,
    ) -> DomainResult<Option<Score>> {
        let row = sqlx::query(
            "SELECT * FROM scores WHERE submission_id = $1 AND seat_id = $2 AND criterion_id = $3",
        )
        .bind(submission_id.as_uuid().to_owned())
        .bind(seat_id.as_uuid().to_owned())
        .bind(criterion_id.as_uuid().to_owned())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("scores.find_by_submission_seat_criterion", e))?;
        row.map(row_to_score)
            .transpose()
            .map_err(|e| map_sqlx_error("scores.find_by_submission_seat_criterion", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_submission(&self, submission_id: SubmissionId) -> DomainResult<Vec<Score>> {
        let rows = sqlx::query("SELECT * FROM scores WHERE submission_id = $1")
            .bind(submission_id.as_uuid().to_owned())
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("scores.list_by_submission", e))?;
        rows.into_iter()
            .map(row_to_score)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("scores.list_by_submission", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_seat_and_category(
        &self,
        seat_id: SeatId,
        category_id: CategoryId,
        phase: Phase,
    ) -> DomainResult<Vec<Score>> {
        let rows = sqlx::query(
            r#"
            SELECT scores.* FROM scores
            JOIN submissions ON submissions.id = scores.submission_id
            WHERE scores.seat_id = $1 AND submissions.category_id = $2 AND scores.phase = $3
            "#,
        )
        .bind(seat_id.as_uuid().to_owned())
        .bind(category_id.as_uuid().to_owned())
        .bind(phase_to_str(phase))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("scores.list_by_seat_and_category", e))?;
        rows.into_iter()
            .map(row_to_score)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("scores.list_by_seat_and_category", e))
    }
}
