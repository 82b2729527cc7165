//! `/submissions` and nested `/scores`: a Team's entry into a Category,
//! its status-machine transitions, and the per-judge scores recorded
//! against it.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::AuditAction;
use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{CategoryId, CriterionId, ScoreId, SubmissionId, TeamId};
use bbqjudge_entries::service::ScoreEditor;
use bbqjudge_entries::Phase;
use bbqjudge_statusmachine::SubmissionStatus;

use crate::app::audit;
use crate::app::cancel::cancelable;
use crate::app::dto::{no_content, ok, with_status};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/categories/:category_id/submissions", get(list_submissions).post(create_submission))
        .route("/submissions/:id", get(get_submission).delete(delete_submission))
        .route("/submissions/:id/turn-in", axum::routing::post(turn_in))
        .route("/submissions/:id/start-judging", axum::routing::post(start_judging))
        .route("/submissions/:id/finalize", axum::routing::post(finalize_submission))
        .route("/submissions/:id/scores", get(list_scores).post(create_score))
        .route("/scores/:id", get(get_score).patch(update_score).delete(hard_delete_score))
}

#[derive(Debug, Deserialize)]
struct CreateSubmissionRequest {
    team_id: TeamId,
}

async fn create_submission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(category_id): Path<CategoryId>,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let submission = cancelable(&token, services.entries.create_submission(body.team_id, category_id, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Submission", submission.id, Some(&submission), None);
    Ok(with_status(axum::http::StatusCode::CREATED, submission))
}

async fn list_submissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(category_id): Path<CategoryId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let submissions =
        cancelable(&token, services.entries.list_submissions_by_category(category_id, principal.is_admin())).await?;
    Ok(ok(submissions))
}

async fn get_submission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    let submission = cancelable(&token, services.entries.get_submission(id, principal.is_admin())).await?;
    Ok(ok(submission))
}

async fn delete_submission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.entries.soft_delete_submission(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Submission", id, None, None);
    Ok(no_content())
}

async fn advance(
    services: &AppServices,
    principal: &Principal,
    token: &CancellationToken,
    id: SubmissionId,
    target: SubmissionStatus,
) -> Result<axum::response::Response, ApiError> {
    authz::require(principal, permissions::WRITE_DOMAIN)?;
    let submission = cancelable(token, services.entries.advance_submission(id, target, Utc::now())).await?;
    audit::record(services, principal, AuditAction::StatusChanged, "Submission", submission.id, Some(&submission), None);
    Ok(ok(submission))
}

async fn turn_in(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    advance(&services, &principal, &token, id, SubmissionStatus::TurnedIn).await
}

async fn start_judging(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    advance(&services, &principal, &token, id, SubmissionStatus::BeingJudged).await
}

async fn finalize_submission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    advance(&services, &principal, &token, id, SubmissionStatus::Scored).await
}

/// Resolve the [`ScoreEditor`] identity a principal acts as: an admin user
/// edits as `Admin`, a seat edits as itself, an operator user may never
/// write scores (only read them).
fn editor_for(principal: &Principal) -> Result<ScoreEditor, ApiError> {
    match principal {
        Principal::User { role, .. } if *role == bbqjudge_auth::Role::Admin => Ok(ScoreEditor::Admin),
        Principal::User { .. } => Err(ApiError::forbidden()),
        Principal::Seat { seat_id, .. } => Ok(ScoreEditor::Seat(*seat_id)),
    }
}

#[derive(Debug, Deserialize)]
struct CreateScoreRequest {
    criterion_id: CriterionId,
    phase: Phase,
    score_value: Decimal,
    comment: Option<String>,
}

async fn create_score(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(submission_id): Path<SubmissionId>,
    Json(body): Json<CreateScoreRequest>,
) -> Result<axum::response::Response, ApiError> {
    let seat_id = match &principal {
        Principal::Seat { seat_id, .. } => *seat_id,
        Principal::User { role, .. } if *role == bbqjudge_auth::Role::Admin => {
            return Err(ApiError::validation("an admin cannot author a score; scores are authored by a seat"));
        }
        Principal::User { .. } => return Err(ApiError::forbidden()),
    };
    let score = cancelable(
        &token,
        services.entries.create_score(
            submission_id,
            seat_id,
            body.criterion_id,
            body.phase,
            body.score_value,
            body.comment,
            Utc::now(),
        ),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Created, "Score", score.id, Some(&score), None);
    Ok(with_status(axum::http::StatusCode::CREATED, score))
}

async fn list_scores(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(submission_id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    let scores = cancelable(&token, services.entries.list_scores_by_submission(submission_id)).await?;
    Ok(ok(scores))
}

async fn get_score(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<ScoreId>,
) -> Result<axum::response::Response, ApiError> {
    let score = cancelable(&token, services.entries.get_score(id)).await?;
    Ok(ok(score))
}

#[derive(Debug, Deserialize, Default)]
struct UpdateScoreRequest {
    score_value: Option<Decimal>,
    comment: Option<Option<String>>,
}

async fn update_score(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<ScoreId>,
    Json(body): Json<UpdateScoreRequest>,
) -> Result<axum::response::Response, ApiError> {
    let editor = editor_for(&principal)?;
    let score =
        cancelable(&token, services.entries.update_score(id, editor, body.score_value, body.comment, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Updated, "Score", score.id, Some(&score), None);
    Ok(ok(score))
}

async fn hard_delete_score(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<ScoreId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::SCORE_HARD_DELETE)?;
    cancelable(&token, services.entries.hard_delete_score(id, ScoreEditor::Admin)).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Score", id, None, None);
    Ok(no_content())
}
