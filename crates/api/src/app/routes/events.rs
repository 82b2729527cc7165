//! `/events` CRUD and status transitions.
//!
//! Admin holds full CRUD; an operator may only move an event's `status`.
//! **Design decision** (spec Open Question, see `DESIGN.md`): a non-admin
//! request that sets `status` *and* any other field is rejected outright
//! with `FORBIDDEN` rather than silently applying the status change and
//! dropping the rest — a partial application of a bulk PATCH is a worse
//! surprise than an explicit rejection.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::AuditAction;
use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{EventId, Pagination, ScoringScale};
use bbqjudge_scoring::AggregationMethod;
use bbqjudge_statusmachine::EventStatus;

use crate::app::audit;
use crate::app::cancel::cancelable;
use crate::app::dto::{no_content, ok, with_status, paginated};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).patch(update_event).delete(delete_event))
}

#[derive(Debug, Deserialize)]
struct ScaleRequest {
    min: Decimal,
    max: Decimal,
    step: Decimal,
}

impl ScaleRequest {
    fn into_scale(self) -> Result<ScoringScale, ApiError> {
        Ok(ScoringScale::new(self.min, self.max, self.step)?)
    }
}

#[derive(Debug, Deserialize)]
struct CreateEventRequest {
    name: String,
    date: NaiveDate,
    location: Option<String>,
    scale: ScaleRequest,
    aggregation_method: AggregationMethod,
}

#[derive(Debug, Deserialize, Default)]
struct ListEventsQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct UpdateEventRequest {
    name: Option<String>,
    date: Option<NaiveDate>,
    location: Option<Option<String>>,
    scale: Option<ScaleRequest>,
    aggregation_method: Option<AggregationMethod>,
    status: Option<EventStatus>,
}

impl UpdateEventRequest {
    fn touches_non_status_field(&self) -> bool {
        self.name.is_some()
            || self.date.is_some()
            || self.location.is_some()
            || self.scale.is_some()
            || self.aggregation_method.is_some()
    }
}

async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Json(body): Json<CreateEventRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::EVENT_CREATE)?;
    let event = cancelable(
        &token,
        services.venue.create_event(
            body.name,
            body.date,
            body.location,
            body.scale.into_scale()?,
            body.aggregation_method,
            Utc::now(),
        ),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Created, "Event", event.id, Some(&event), Some(event.id));
    Ok(with_status(axum::http::StatusCode::CREATED, event))
}

async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Query(query): Query<ListEventsQuery>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let include_deleted = query.include_deleted.unwrap_or(false);
    if include_deleted {
        authz::require(&principal, permissions::READ_DELETED)?;
    }
    let pagination = Pagination::new(query.page.unwrap_or(1), query.page_size.unwrap_or(20));
    let (events, page_info) = cancelable(&token, services.venue.list_events(include_deleted, pagination)).await?;
    Ok(paginated(events, page_info))
}

async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let include_deleted = principal.is_admin();
    let event = cancelable(&token, services.venue.get_event(id, include_deleted)).await?;
    Ok(ok(event))
}

async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<EventId>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<axum::response::Response, ApiError> {
    let is_admin = principal.is_admin();

    if body.touches_non_status_field() && !is_admin {
        return Err(ApiError::forbidden());
    }

    let mut event = None;
    if body.touches_non_status_field() {
        let scale = body.scale.map(ScaleRequest::into_scale).transpose()?;
        event = Some(
            cancelable(
                &token,
                services.venue.update_event(
                    id,
                    bbqjudge_venue::event::UpdateEvent {
                        name: body.name,
                        date: body.date,
                        location: body.location,
                        scale,
                        aggregation_method: body.aggregation_method,
                        now: Utc::now(),
                    },
                ),
            )
            .await?,
        );
    }

    if let Some(target) = body.status {
        authz::require(&principal, permissions::EVENT_STATUS_UPDATE)?;
        let updated = cancelable(&token, services.venue.change_event_status(id, target, Utc::now())).await?;
        audit::record(&services, &principal, AuditAction::StatusChanged, "Event", updated.id, Some(&updated), Some(updated.id));
        event = Some(updated);
    } else if let Some(ref updated) = event {
        audit::record(&services, &principal, AuditAction::Updated, "Event", updated.id, Some(updated), Some(updated.id));
    }

    match event {
        Some(event) => Ok(ok(event)),
        None => Ok(ok(cancelable(&token, services.venue.get_event(id, false)).await?)),
    }
}

async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&principal)?;
    cancelable(&token, services.venue.soft_delete_event(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Event", id, None, Some(id));
    Ok(no_content())
}
