//! Postgres-backed append-only audit repository.

use std::sync::Arc;

use sqlx::{PgPool, QueryBuilder, Row};

use bbqjudge_audit::model::{ActorType, AuditAction, AuditLog};
use bbqjudge_audit::repo::{AuditLogFilter, AuditRepository};
use bbqjudge_core::{AuditLogId, DomainError, DomainResult, EventId, PageInfo, Pagination};

use crate::error::map_sqlx_error;

fn actor_type_to_str(actor_type: ActorType) -> &'static str {
    match actor_type {
        ActorType::User => "user",
        ActorType::Judge => "judge",
        ActorType::System => "system",
    }
}

fn actor_type_from_str(s: &str) -> ActorType {
    match s {
        "judge" => ActorType::Judge,
        "system" => ActorType::System,
        _ => ActorType::User,
    }
}

fn action_to_str(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Created => "created",
        AuditAction::Updated => "updated",
        AuditAction::SoftDeleted => "soft_deleted",
        AuditAction::StatusChanged => "status_changed",
    }
}

fn action_from_str(s: &str) -> AuditAction {
    match s {
        "updated" => AuditAction::Updated,
        "soft_deleted" => AuditAction::SoftDeleted,
        "status_changed" => AuditAction::StatusChanged,
        _ => AuditAction::Created,
    }
}

fn row_to_audit_log(row: sqlx::postgres::PgRow) -> Result<AuditLog, sqlx::Error> {
    Ok(AuditLog {
        id: AuditLogId::from_uuid(row.try_get("id")?),
        timestamp: row.try_get("timestamp")?,
        actor_type: actor_type_from_str(row.try_get::<String, _>("actor_type")?.as_str()),
        actor_id: row.try_get("actor_id")?,
        action: action_from_str(row.try_get::<String, _>("action")?.as_str()),
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        old_value: row.try_get("old_value")?,
        new_value: row.try_get("new_value")?,
        event_id: row
            .try_get::<Option<uuid::Uuid>, _>("event_id")?
            .map(EventId::from_uuid),
        ip_address: row.try_get("ip_address")?,
        device_fingerprint: row.try_get("device_fingerprint")?,
        idempotency_key: row.try_get("idempotency_key")?,
    })
}

pub struct PgAuditRepository {
    pool: Arc<PgPool>,
}

impl PgAuditRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditRepository for PgAuditRepository {
    #[tracing::instrument(skip(self, log), err)]
    async fn append(&self, log: AuditLog) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (id, timestamp, actor_type, actor_id, action, entity_type, entity_id,
                 old_value, new_value, event_id, ip_address, device_fingerprint, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(log.id.as_uuid().to_owned())
        .bind(log.timestamp)
        .bind(actor_type_to_str(log.actor_type))
        .bind(&log.actor_id)
        .bind(action_to_str(log.action))
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.old_value)
        .bind(&log.new_value)
        .bind(log.event_id.map(|id| id.as_uuid().to_owned()))
        .bind(&log.ip_address)
        .bind(&log.device_fingerprint)
        .bind(&log.idempotency_key)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("audit_logs.append", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: AuditLogId) -> Result<Option<AuditLog>, DomainError> {
        let row = sqlx::query("SELECT * FROM audit_logs WHERE id = $1")
            .bind(id.as_uuid().to_owned())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("audit_logs.find_by_id", e))?;
        row.map(row_to_audit_log)
            .transpose()
            .map_err(|e| map_sqlx_error("audit_logs.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list(
        &self,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<AuditLog>, PageInfo), DomainError> {
        let mut count_qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT count(*) FROM audit_logs WHERE 1 = 1");
        push_filter(&mut count_qb, &filter);
        let total_items: i64 = count_qb
            .build()
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("audit_logs.list.count", e))?
            .try_get(0)
            .map_err(|e| map_sqlx_error("audit_logs.list.count", e))?;

        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM audit_logs WHERE 1 = 1");
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY timestamp DESC LIMIT ");
        qb.push_bind(pagination.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset() as i64);

        let rows = qb
            .build()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("audit_logs.list", e))?;
        let logs = rows
            .into_iter()
            .map(row_to_audit_log)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("audit_logs.list", e))?;
        Ok((logs, PageInfo::new(pagination, total_items as u64)))
    }
}

fn push_filter(qb: &mut QueryBuilder<sqlx::Postgres>, filter: &AuditLogFilter) {
    if let Some(entity_type) = &filter.entity_type {
        qb.push(" AND entity_type = ");
        qb.push_bind(entity_type.clone());
    }
    if let Some(action) = filter.action {
        qb.push(" AND action = ");
        qb.push_bind(action_to_str(action));
    }
    if let Some(actor_type) = filter.actor_type {
        qb.push(" AND actor_type = ");
        qb.push_bind(actor_type_to_str(actor_type));
    }
    if let Some(event_id) = filter.event_id {
        qb.push(" AND event_id = ");
        qb.push_bind(event_id.as_uuid().to_owned());
    }
    if let Some(from) = filter.from {
        qb.push(" AND timestamp >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND timestamp <= ");
        qb.push_bind(to);
    }
}
