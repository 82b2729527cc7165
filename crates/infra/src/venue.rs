//! Postgres-backed repositories for the venue hierarchy: `events`, `tables`,
//! `seats`. Each row round-trips through the aggregate's `hydrate`
//! constructor rather than a derived `FromRow`, since `version`/`created`
//! stay private to the aggregate's own module.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use bbqjudge_core::{
    AggregateRoot, DomainResult, EventId, PageInfo, Pagination, ScoringScale, SeatId, TableId,
};
use bbqjudge_scoring::AggregationMethod;
use bbqjudge_statusmachine::EventStatus;
use bbqjudge_venue::event::Event;
use bbqjudge_venue::repo::{EventRepository, SeatRepository, TableRepository};
use bbqjudge_venue::seat::Seat;
use bbqjudge_venue::table::Table;

use crate::error::map_sqlx_error;

fn status_to_str(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Draft => "draft",
        EventStatus::Active => "active",
        EventStatus::Finalized => "finalized",
        EventStatus::Archived => "archived",
    }
}

fn status_from_str(s: &str) -> EventStatus {
    match s {
        "active" => EventStatus::Active,
        "finalized" => EventStatus::Finalized,
        "archived" => EventStatus::Archived,
        _ => EventStatus::Draft,
    }
}

fn aggregation_to_str(method: AggregationMethod) -> &'static str {
    match method {
        AggregationMethod::Mean => "mean",
        AggregationMethod::TrimmedMean => "trimmed_mean",
    }
}

fn aggregation_from_str(s: &str) -> AggregationMethod {
    match s {
        "trimmed_mean" => AggregationMethod::TrimmedMean,
        _ => AggregationMethod::Mean,
    }
}

fn row_to_event(row: sqlx::postgres::PgRow) -> Result<Event, sqlx::Error> {
    let scale = ScoringScale {
        min: row.try_get::<Decimal, _>("scale_min")?,
        max: row.try_get::<Decimal, _>("scale_max")?,
        step: row.try_get::<Decimal, _>("scale_step")?,
    };
    Ok(Event::hydrate(
        EventId::from_uuid(row.try_get("id")?),
        row.try_get("name")?,
        row.try_get("date")?,
        row.try_get("location")?,
        status_from_str(row.try_get::<String, _>("status")?.as_str()),
        scale,
        aggregation_from_str(row.try_get::<String, _>("aggregation_method")?.as_str()),
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgEventRepository {
    pool: Arc<PgPool>,
}

impl PgEventRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventRepository for PgEventRepository {
    #[tracing::instrument(skip(self, event), err)]
    async fn create(&self, event: Event) -> DomainResult<Event> {
        sqlx::query(
            r#"
            INSERT INTO events
                (id, name, date, location, status, scale_min, scale_max, scale_step,
                 aggregation_method, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(event.id.as_uuid().to_owned())
        .bind(&event.name)
        .bind(event.date)
        .bind(&event.location)
        .bind(status_to_str(event.status))
        .bind(event.scale.min)
        .bind(event.scale.max)
        .bind(event.scale.step)
        .bind(aggregation_to_str(event.aggregation_method))
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(event.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("events.create", e))?;
        Ok(event)
    }

    #[tracing::instrument(skip(self, event), err)]
    async fn update(&self, event: Event) -> DomainResult<Event> {
        sqlx::query(
            r#"
            UPDATE events SET
                name = $2, date = $3, location = $4, status = $5,
                scale_min = $6, scale_max = $7, scale_step = $8,
                aggregation_method = $9, updated_at = $10, deleted_at = $11, version = $12
            WHERE id = $1
            "#,
        )
        .bind(event.id.as_uuid().to_owned())
        .bind(&event.name)
        .bind(event.date)
        .bind(&event.location)
        .bind(status_to_str(event.status))
        .bind(event.scale.min)
        .bind(event.scale.max)
        .bind(event.scale.step)
        .bind(aggregation_to_str(event.aggregation_method))
        .bind(event.updated_at)
        .bind(event.deleted_at)
        .bind(event.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("events.update", e))?;
        Ok(event)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: EventId, include_deleted: bool) -> DomainResult<Option<Event>> {
        let row = sqlx::query(
            "SELECT * FROM events WHERE id = $1 AND ($2 OR deleted_at IS NULL)",
        )
        .bind(id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("events.find_by_id", e))?;

        row.map(row_to_event)
            .transpose()
            .map_err(|e| map_sqlx_error("events.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list(&self, include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM events WHERE ($1 OR deleted_at IS NULL)")
            .bind(include_deleted)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("events.list.count", e))?
            .try_get("count")
            .map_err(|e| map_sqlx_error("events.list.count", e))?;

        let rows = sqlx::query(
            "SELECT * FROM events WHERE ($1 OR deleted_at IS NULL) ORDER BY created_at ASC LIMIT $2 OFFSET $3",
        )
        .bind(include_deleted)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("events.list", e))?;

        let events = rows
            .into_iter()
            .map(row_to_event)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("events.list", e))?;

        Ok((events, PageInfo::new(pagination, total.max(0) as u64)))
    }
}

fn row_to_table(row: sqlx::postgres::PgRow) -> Result<Table, sqlx::Error> {
    Ok(Table::hydrate(
        TableId::from_uuid(row.try_get("id")?),
        EventId::from_uuid(row.try_get("event_id")?),
        row.try_get::<i32, _>("table_number")? as u32,
        row.try_get("qr_token")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgTableRepository {
    pool: Arc<PgPool>,
}

impl PgTableRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TableRepository for PgTableRepository {
    #[tracing::instrument(skip(self, table), err)]
    async fn create(&self, table: Table) -> DomainResult<Table> {
        sqlx::query(
            r#"
            INSERT INTO tables (id, event_id, table_number, qr_token, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(table.id.as_uuid().to_owned())
        .bind(table.event_id.as_uuid().to_owned())
        .bind(table.table_number as i32)
        .bind(&table.qr_token)
        .bind(table.created_at)
        .bind(table.updated_at)
        .bind(table.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("tables.create", e))?;
        Ok(table)
    }

    #[tracing::instrument(skip(self, table), err)]
    async fn update(&self, table: Table) -> DomainResult<Table> {
        sqlx::query(
            r#"
            UPDATE tables SET qr_token = $2, updated_at = $3, deleted_at = $4, version = $5
            WHERE id = $1
            "#,
        )
        .bind(table.id.as_uuid().to_owned())
        .bind(&table.qr_token)
        .bind(table.updated_at)
        .bind(table.deleted_at)
        .bind(table.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("tables.update", e))?;
        Ok(table)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: TableId, include_deleted: bool) -> DomainResult<Option<Table>> {
        let row = sqlx::query("SELECT * FROM tables WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("tables.find_by_id", e))?;
        row.map(row_to_table).transpose().map_err(|e| map_sqlx_error("tables.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_table_number(&self, event_id: EventId, table_number: u32) -> DomainResult<Option<Table>> {
        let row = sqlx::query(
            "SELECT * FROM tables WHERE event_id = $1 AND table_number = $2 AND deleted_at IS NULL",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(table_number as i32)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("tables.find_by_table_number", e))?;
        row.map(row_to_table).transpose().map_err(|e| map_sqlx_error("tables.find_by_table_number", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_qr_token(&self, qr_token: &str) -> DomainResult<Option<Table>> {
        let row = sqlx::query("SELECT * FROM tables WHERE qr_token = $1")
            .bind(qr_token)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("tables.find_by_qr_token", e))?;
        row.map(row_to_table).transpose().map_err(|e| map_sqlx_error("tables.find_by_qr_token", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Table>> {
        let rows = sqlx::query(
            "SELECT * FROM tables WHERE event_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY table_number ASC",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("tables.list_by_event", e))?;
        rows.into_iter()
            .map(row_to_table)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("tables.list_by_event", e))
    }
}

fn row_to_seat(row: sqlx::postgres::PgRow) -> Result<Seat, sqlx::Error> {
    Ok(Seat::hydrate(
        SeatId::from_uuid(row.try_get("id")?),
        TableId::from_uuid(row.try_get("table_id")?),
        row.try_get::<i32, _>("seat_number")? as u32,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgSeatRepository {
    pool: Arc<PgPool>,
}

impl PgSeatRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SeatRepository for PgSeatRepository {
    #[tracing::instrument(skip(self, seat), err)]
    async fn create(&self, seat: Seat) -> DomainResult<Seat> {
        sqlx::query(
            r#"
            INSERT INTO seats (id, table_id, seat_number, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(seat.id.as_uuid().to_owned())
        .bind(seat.table_id.as_uuid().to_owned())
        .bind(seat.seat_number as i32)
        .bind(seat.created_at)
        .bind(seat.updated_at)
        .bind(seat.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("seats.create", e))?;
        Ok(seat)
    }

    #[tracing::instrument(skip(self, seat), err)]
    async fn update(&self, seat: Seat) -> DomainResult<Seat> {
        sqlx::query("UPDATE seats SET updated_at = $2, deleted_at = $3, version = $4 WHERE id = $1")
            .bind(seat.id.as_uuid().to_owned())
            .bind(seat.updated_at)
            .bind(seat.deleted_at)
            .bind(seat.version() as i64)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("seats.update", e))?;
        Ok(seat)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: SeatId, include_deleted: bool) -> DomainResult<Option<Seat>> {
        let row = sqlx::query("SELECT * FROM seats WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("seats.find_by_id", e))?;
        row.map(row_to_seat).transpose().map_err(|e| map_sqlx_error("seats.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_seat_number(&self, table_id: TableId, seat_number: u32) -> DomainResult<Option<Seat>> {
        let row = sqlx::query(
            "SELECT * FROM seats WHERE table_id = $1 AND seat_number = $2 AND deleted_at IS NULL",
        )
        .bind(table_id.as_uuid().to_owned())
        .bind(seat_number as i32)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("seats.find_by_seat_number", e))?;
        row.map(row_to_seat).transpose().map_err(|e| map_sqlx_error("seats.find_by_seat_number", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_table(&self, table_id: TableId, include_deleted: bool) -> DomainResult<Vec<Seat>> {
        let rows = sqlx::query(
            "SELECT * FROM seats WHERE table_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY seat_number ASC",
        )
        .bind(table_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("seats.list_by_table", e))?;
        rows.into_iter()
            .map(row_to_seat)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("seats.list_by_table", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn count_active_for_event(&self, event_id: EventId) -> DomainResult<u32> {
        let count: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM seats
            JOIN tables ON tables.id = seats.table_id
            WHERE tables.event_id = $1 AND tables.deleted_at IS NULL AND seats.deleted_at IS NULL
            "#,
        )
        .bind(event_id.as_uuid().to_owned())
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("seats.count_active_for_event", e))?
        .try_get("count")
        .map_err(|e| map_sqlx_error("seats.count_active_for_event", e))?;
        Ok(count.max(0) as u32)
    }
}
