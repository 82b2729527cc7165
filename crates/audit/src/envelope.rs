//! `AuditEnvelope<P>` separates the infrastructure metadata every audit
//! write needs (actor, action, request context) from the domain payload
//! being recorded, the way an event-sourced system separates an envelope
//! from the event it carries. Here the "event" is a before/after snapshot
//! of a mutation rather than an authoritative fact the system replays.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bbqjudge_core::{AuditLogId, EventId};

use crate::model::{ActorType, AuditAction, AuditLog};
use crate::sanitize::sanitize_value;

/// Who performed the mutation being audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
}

impl ActorContext {
    pub fn system() -> Self {
        Self {
            actor_type: ActorType::System,
            actor_id: None,
        }
    }
}

/// Request-scope metadata carried alongside every mutation, independent of
/// the entity being changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub event_id: Option<EventId>,
    pub ip_address: Option<String>,
    pub device_fingerprint: Option<String>,
    pub idempotency_key: Option<String>,
}

/// A pending audit write, generic over the typed payload `P` the caller has
/// on hand (a DTO, an aggregate snapshot, …) before it is serialized,
/// sanitized, and turned into a persisted [`AuditLog`] row.
#[derive(Debug, Clone)]
pub struct AuditEnvelope<P> {
    pub actor: ActorContext,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    pub old_value: Option<P>,
    pub new_value: Option<P>,
    pub metadata: RequestMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditEncodeError {
    #[error("failed to serialize audit payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl<P: Serialize> AuditEnvelope<P> {
    /// Serialize and sanitize the payload, producing the row to persist.
    /// `id` and `timestamp` are supplied by the caller rather than derived
    /// here, so the sink can stay a pure function of its inputs.
    pub fn into_log(
        self,
        id: AuditLogId,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditLog, AuditEncodeError> {
        let old_value = self
            .old_value
            .map(|v| serde_json::to_value(v).map(sanitize_value))
            .transpose()?;
        let new_value = self
            .new_value
            .map(|v| serde_json::to_value(v).map(sanitize_value))
            .transpose()?;

        Ok(AuditLog {
            id,
            timestamp,
            actor_type: self.actor.actor_type,
            actor_id: self.actor.actor_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            old_value,
            new_value,
            event_id: self.metadata.event_id,
            ip_address: self.metadata.ip_address,
            device_fingerprint: self.metadata.device_fingerprint,
            idempotency_key: self.metadata.idempotency_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct TeamSnapshot {
        name: String,
        barcode_payload: String,
    }

    #[test]
    fn into_log_sanitizes_and_stamps() {
        let envelope = AuditEnvelope {
            actor: ActorContext {
                actor_type: ActorType::User,
                actor_id: Some("user-1".into()),
            },
            action: AuditAction::Updated,
            entity_type: "Team".into(),
            entity_id: "team-1".into(),
            old_value: Some(TeamSnapshot {
                name: "Smoke Signals".into(),
                barcode_payload: "old-payload".into(),
            }),
            new_value: Some(TeamSnapshot {
                name: "Smoke Signals II".into(),
                barcode_payload: "new-payload".into(),
            }),
            metadata: RequestMetadata::default(),
        };

        let id = AuditLogId::new();
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let log = envelope.into_log(id, ts).unwrap();

        assert_eq!(log.id, id);
        assert_eq!(log.action, AuditAction::Updated);
        assert_eq!(log.old_value.unwrap()["name"], "Smoke Signals");
    }
}
