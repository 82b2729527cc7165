//! `/audit-logs`: the append-only mutation trail. An admin may query the
//! full, unscoped trail; any authenticated principal may read it scoped to
//! a single event.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::{ActorType, AuditAction, AuditLogFilter};
use bbqjudge_auth::Principal;
use bbqjudge_core::{AuditLogId, EventId, Pagination};

use crate::app::cancel::cancelable;
use crate::app::dto::{ok, paginated};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/audit-logs", axum::routing::get(list_audit_logs))
        .route("/audit-logs/:id", axum::routing::get(get_audit_log))
        .route("/events/:event_id/audit-logs", axum::routing::get(list_event_audit_logs))
}

#[derive(Debug, Deserialize, Default)]
struct AuditLogQuery {
    entity_type: Option<String>,
    action: Option<AuditAction>,
    actor_type: Option<ActorType>,
    event_id: Option<EventId>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl AuditLogQuery {
    fn into_filter(self) -> AuditLogFilter {
        AuditLogFilter {
            entity_type: self.entity_type,
            action: self.action,
            actor_type: self.actor_type,
            event_id: self.event_id,
            from: self.from,
            to: self.to,
        }
    }
}

/// Global, unscoped audit trail — admin only.
async fn list_audit_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Query(query): Query<AuditLogQuery>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_admin(&principal)?;
    let pagination = Pagination::new(query.page.unwrap_or(1), query.page_size.unwrap_or(20));
    let filter = AuditLogQuery { page: None, page_size: None, ..query }.into_filter();
    let (logs, page_info) = cancelable(&token, services.audit_repo.list(filter, pagination)).await?;
    Ok(paginated(logs, page_info))
}

/// Audit trail scoped to one event — any authenticated principal.
async fn list_event_audit_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Query(query): Query<AuditLogQuery>,
) -> Result<axum::response::Response, ApiError> {
    let pagination = Pagination::new(query.page.unwrap_or(1), query.page_size.unwrap_or(20));
    let mut filter = AuditLogQuery { page: None, page_size: None, ..query }.into_filter();
    filter.event_id = Some(event_id);
    let (logs, page_info) = cancelable(&token, services.audit_repo.list(filter, pagination)).await?;
    Ok(paginated(logs, page_info))
}

async fn get_audit_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<AuditLogId>,
) -> Result<axum::response::Response, ApiError> {
    let log = cancelable(&token, services.audit_repo.find_by_id(id))
        .await?
        .ok_or_else(bbqjudge_core::DomainError::not_found)?;
    if log.event_id.is_none() {
        authz::require_admin(&principal)?;
    }
    Ok(ok(log))
}
