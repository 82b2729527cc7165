//! Repository abstractions for the venue hierarchy (Event, Table, Seat).
//! Domain services depend on these traits, never on a concrete store;
//! `bbqjudge-infra` provides the Postgres-backed implementations.

use async_trait::async_trait;

use bbqjudge_core::{DomainResult, EventId, PageInfo, Pagination, SeatId, TableId};

use crate::event::Event;
use crate::seat::Seat;
use crate::table::Table;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> DomainResult<Event>;
    async fn update(&self, event: Event) -> DomainResult<Event>;
    async fn find_by_id(&self, id: EventId, include_deleted: bool) -> DomainResult<Option<Event>>;
    async fn list(&self, include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)>;
}

#[async_trait]
pub trait TableRepository: Send + Sync {
    async fn create(&self, table: Table) -> DomainResult<Table>;
    async fn update(&self, table: Table) -> DomainResult<Table>;
    async fn find_by_id(&self, id: TableId, include_deleted: bool) -> DomainResult<Option<Table>>;
    async fn find_by_table_number(
        &self,
        event_id: EventId,
        table_number: u32,
    ) -> DomainResult<Option<Table>>;
    async fn find_by_qr_token(&self, qr_token: &str) -> DomainResult<Option<Table>>;
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Table>>;
}

#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn create(&self, seat: Seat) -> DomainResult<Seat>;
    async fn update(&self, seat: Seat) -> DomainResult<Seat>;
    async fn find_by_id(&self, id: SeatId, include_deleted: bool) -> DomainResult<Option<Seat>>;
    async fn find_by_seat_number(&self, table_id: TableId, seat_number: u32) -> DomainResult<Option<Seat>>;
    async fn list_by_table(&self, table_id: TableId, include_deleted: bool) -> DomainResult<Vec<Seat>>;
    /// Count of non-deleted seats under tables whose parent table is itself
    /// non-deleted, for a whole event — the "active judges" count used by
    /// the results service's `completion_status` derivation.
    async fn count_active_for_event(&self, event_id: EventId) -> DomainResult<u32>;
}
