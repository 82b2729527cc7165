//! The append-only audit row and the vocabulary it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::{AuditLogId, EventId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    User,
    Judge,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    SoftDeleted,
    StatusChanged,
}

/// One row of the audit trail. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub timestamp: DateTime<Utc>,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub event_id: Option<EventId>,
    pub ip_address: Option<String>,
    pub device_fingerprint: Option<String>,
    pub idempotency_key: Option<String>,
}
