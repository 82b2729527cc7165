//! `/events/:eventId/tables` and `/tables/:tableId/seats`: the physical
//! layout judges and seats are scoped to, plus QR-token regeneration.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::AuditAction;
use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{EventId, SeatId, TableId};

use crate::app::audit;
use crate::app::cancel::cancelable;
use crate::app::dto::{no_content, ok, with_status};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/events/:event_id/tables", get(list_tables).post(create_table))
        .route("/tables/:id", get(get_table).delete(delete_table))
        .route("/tables/:id/regenerate-token", axum::routing::post(regenerate_table_token))
        .route("/tables/:table_id/seats", get(list_seats).post(create_seat))
        .route("/seats/:id", get(get_seat).delete(delete_seat))
}

#[derive(Debug, Deserialize)]
struct CreateTableRequest {
    table_number: u32,
}

async fn create_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<CreateTableRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let table = cancelable(&token, services.venue.create_table(event_id, body.table_number, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Table", table.id, Some(&table), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, table))
}

async fn list_tables(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let include_deleted = principal.is_admin();
    let tables = cancelable(&token, services.venue.list_tables_by_event(event_id, include_deleted)).await?;
    Ok(ok(tables))
}

async fn get_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TableId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let table = cancelable(&token, services.venue.get_table(id, principal.is_admin())).await?;
    Ok(ok(table))
}

async fn regenerate_table_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TableId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let table = cancelable(&token, services.venue.regenerate_table_token(id, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Updated, "Table", table.id, Some(&table), Some(table.event_id));
    Ok(ok(table))
}

async fn delete_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<TableId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.venue.soft_delete_table(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Table", id, None, None);
    Ok(no_content())
}

#[derive(Debug, Deserialize)]
struct CreateSeatRequest {
    seat_number: u32,
}

async fn create_seat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(table_id): Path<TableId>,
    Json(body): Json<CreateSeatRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let seat = cancelable(&token, services.venue.create_seat(table_id, body.seat_number, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Seat", seat.id, Some(&seat), None);
    Ok(with_status(axum::http::StatusCode::CREATED, seat))
}

async fn list_seats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(table_id): Path<TableId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let include_deleted = principal.is_admin();
    let seats = cancelable(&token, services.venue.list_seats_by_table(table_id, include_deleted)).await?;
    Ok(ok(seats))
}

async fn get_seat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SeatId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let seat = cancelable(&token, services.venue.get_seat(id, principal.is_admin())).await?;
    Ok(ok(seat))
}

async fn delete_seat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SeatId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.venue.soft_delete_seat(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Seat", id, None, None);
    Ok(no_content())
}
