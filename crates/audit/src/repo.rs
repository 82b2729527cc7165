//! Storage-agnostic access to the audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bbqjudge_core::{AuditLogId, DomainError, EventId, PageInfo, Pagination};

use crate::model::{ActorType, AuditAction, AuditLog};

/// Filter for listing audit rows. All fields are optional narrowing
/// criteria; `None` means "don't filter on this dimension".
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_type: Option<ActorType>,
    pub event_id: Option<EventId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Append-only access to the audit trail. The append path is best-effort
/// from the caller's perspective — a storage failure here must never roll
/// back the mutation that triggered it (see [`crate::sink::AuditSink`]).
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, log: AuditLog) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: AuditLogId) -> Result<Option<AuditLog>, DomainError>;

    async fn list(
        &self,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<AuditLog>, PageInfo), DomainError>;
}
