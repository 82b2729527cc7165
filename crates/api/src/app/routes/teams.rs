//! `/events/:eventId/teams`: competing entries and their barcode lifecycle.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::AuditAction;
use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{EventId, TeamId};
use bbqjudge_teams::service::NewTeam;
use bbqjudge_teams::team::UpdateTeam;

use crate::app::audit;
use crate::app::cancel::cancelable;
use crate::app::dto::{no_content, ok, with_status};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/events/:event_id/teams", get(list_teams).post(create_team))
        .route("/events/:event_id/teams/bulk", axum::routing::post(bulk_create_teams))
        .route("/teams/:id", get(get_team).patch(update_team).delete(delete_team))
        .route("/teams/:id/invalidate-code", axum::routing::post(invalidate_code))
        .route("/teams/verify-barcode", axum::routing::post(verify_barcode))
}

#[derive(Debug, Deserialize)]
struct CreateTeamRequest {
    name: String,
    team_number: u32,
}

#[derive(Debug, Deserialize)]
struct BulkTeamItem {
    name: String,
    team_number: u32,
}

#[derive(Debug, Deserialize)]
struct BulkCreateTeamsRequest {
    items: Vec<BulkTeamItem>,
}

#[derive(Debug, Deserialize, Default)]
struct UpdateTeamRequest {
    name: Option<String>,
    team_number: Option<u32>,
}

async fn create_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<CreateTeamRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let team = cancelable(&token, services.teams.create_team(event_id, body.name, body.team_number, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Team", team.id, Some(&team), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, team))
}

async fn bulk_create_teams(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<BulkCreateTeamsRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let items = body
        .items
        .into_iter()
        .map(|i| NewTeam { name: i.name, team_number: i.team_number })
        .collect();
    let created = cancelable(&token, services.teams.bulk_create_teams(event_id, items, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Team", event_id, Some(&created), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, created))
}

async fn list_teams(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let teams = cancelable(&token, services.teams.list_teams_by_event(event_id, principal.is_admin())).await?;
    Ok(ok(teams))
}

async fn get_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TeamId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let team = cancelable(&token, services.teams.get_team(id, principal.is_admin())).await?;
    Ok(ok(team))
}

async fn update_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TeamId>,
    Json(body): Json<UpdateTeamRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let team = cancelable(
        &token,
        services.teams.update_team(id, UpdateTeam { name: body.name, team_number: body.team_number, now: Utc::now() }),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Updated, "Team", team.id, Some(&team), Some(team.event_id));
    Ok(ok(team))
}

async fn delete_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TeamId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.teams.soft_delete_team(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Team", id, None, None);
    Ok(no_content())
}

async fn invalidate_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TeamId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let team = cancelable(&token, services.teams.invalidate_code(id, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Updated, "Team", team.id, Some(&team), Some(team.event_id));
    Ok(ok(team))
}

#[derive(Debug, Deserialize)]
struct VerifyBarcodeRequest {
    payload: String,
    event_id: Option<EventId>,
}

/// Any authenticated principal (user or seat) may scan a barcode.
async fn verify_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Json(body): Json<VerifyBarcodeRequest>,
) -> Result<axum::response::Response, ApiError> {
    let verification = cancelable(&token, services.teams.verify_barcode(&body.payload, body.event_id)).await?;
    Ok(ok(verification_response(verification)))
}

fn verification_response(v: bbqjudge_teams::BarcodeVerification) -> serde_json::Value {
    serde_json::json!({
        "valid": v.valid,
        "team": v.team,
        "error": v.error,
    })
}
