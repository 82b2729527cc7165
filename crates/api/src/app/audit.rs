//! Glue between a request's [`Principal`] and the audit sink: every
//! mutating handler calls [`record`] with the entity it just wrote so the
//! append-only trail covers the full write surface, not just a subset
//! someone remembered to instrument.

use chrono::Utc;
use serde::Serialize;

use bbqjudge_audit::{ActorContext, ActorType, AuditAction, AuditEnvelope, RequestMetadata};
use bbqjudge_auth::Principal;
use bbqjudge_core::{AuditLogId, EventId};

use crate::app::services::AppServices;

fn actor_context(principal: &Principal) -> ActorContext {
    match principal {
        Principal::User { user_id, .. } => {
            ActorContext { actor_type: ActorType::User, actor_id: Some(user_id.to_string()) }
        }
        Principal::Seat { seat_id, .. } => {
            ActorContext { actor_type: ActorType::Judge, actor_id: Some(seat_id.to_string()) }
        }
    }
}

/// Record a mutation against `entity_type`/`entity_id`. Failures to encode
/// the payload are logged and otherwise swallowed — audit logging must
/// never fail the request that triggered it.
#[allow(clippy::too_many_arguments)]
pub fn record<P: Serialize>(
    services: &AppServices,
    principal: &Principal,
    action: AuditAction,
    entity_type: &'static str,
    entity_id: impl std::fmt::Display,
    new_value: Option<P>,
    event_id: Option<EventId>,
) {
    let envelope = AuditEnvelope {
        actor: actor_context(principal),
        action,
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        old_value: None::<P>,
        new_value,
        metadata: RequestMetadata { event_id, ..Default::default() },
    };
    match envelope.into_log(AuditLogId::new(), Utc::now()) {
        Ok(log) => services.audit.record(log),
        Err(error) => tracing::error!(%error, entity_type, %entity_id, "failed to encode audit log"),
    }
}
