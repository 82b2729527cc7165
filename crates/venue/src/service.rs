//! `VenueService`: CRUD + invariants over Event, Table, and Seat, built on
//! top of the pure aggregates and the repository traits.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use bbqjudge_core::{Aggregate, DomainError, DomainResult, EventId, PageInfo, Pagination, ScoringScale, SeatId, TableId};
use bbqjudge_scoring::AggregationMethod;
use bbqjudge_statusmachine::EventStatus;

use crate::event::{ChangeEventStatus, CreateEvent, Event, EventCommand, SoftDeleteEvent, UpdateEvent};
use crate::repo::{EventRepository, SeatRepository, TableRepository};
use crate::seat::{CreateSeat, Seat, SeatCommand, SoftDeleteSeat};
use crate::table::{CreateTable, RegenerateToken, SoftDeleteTable, Table, TableCommand};

pub struct VenueService {
    events: Arc<dyn EventRepository>,
    tables: Arc<dyn TableRepository>,
    seats: Arc<dyn SeatRepository>,
}

impl VenueService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tables: Arc<dyn TableRepository>,
        seats: Arc<dyn SeatRepository>,
    ) -> Self {
        Self { events, tables, seats }
    }

    pub async fn create_event(
        &self,
        name: String,
        date: NaiveDate,
        location: Option<String>,
        scale: ScoringScale,
        aggregation_method: AggregationMethod,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let mut event = Event::empty(EventId::new());
        let events = event.handle(&EventCommand::Create(CreateEvent {
            id: event.id,
            name,
            date,
            location,
            scale,
            aggregation_method,
            now,
        }))?;
        for e in &events {
            event.apply(e);
        }
        self.events.create(event).await
    }

    pub async fn list_events(&self, include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)> {
        self.events.list(include_deleted, pagination).await
    }

    pub async fn get_event(&self, id: EventId, include_deleted: bool) -> DomainResult<Event> {
        self.events
            .find_by_id(id, include_deleted)
            .await?
            .ok_or_else(DomainError::not_found)
    }

    pub async fn update_event(&self, id: EventId, update: UpdateEvent) -> DomainResult<Event> {
        let mut event = self.get_event(id, false).await?;
        let events = event.handle(&EventCommand::Update(update))?;
        for e in &events {
            event.apply(e);
        }
        self.events.update(event).await
    }

    pub async fn change_event_status(
        &self,
        id: EventId,
        target: EventStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let mut event = self.get_event(id, false).await?;
        let events = event.handle(&EventCommand::ChangeStatus(ChangeEventStatus { target, now }))?;
        for e in &events {
            event.apply(e);
        }
        self.events.update(event).await
    }

    pub async fn soft_delete_event(&self, id: EventId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut event = self.get_event(id, false).await?;
        let events = event.handle(&EventCommand::SoftDelete(SoftDeleteEvent { now }))?;
        for e in &events {
            event.apply(e);
        }
        self.events.update(event).await?;
        Ok(())
    }

    pub async fn create_table(
        &self,
        event_id: EventId,
        table_number: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Table> {
        // Parent existence.
        self.get_event(event_id, false).await?;

        if self.tables.find_by_table_number(event_id, table_number).await?.is_some() {
            return Err(DomainError::conflict("table_number already in use for this event"));
        }

        let mut table = Table::empty(TableId::new());
        let events = table.handle(&TableCommand::Create(CreateTable {
            id: table.id,
            event_id,
            table_number,
            now,
        }))?;
        for e in &events {
            table.apply(e);
        }

        // The mint loop guards the astronomically unlikely case of a
        // qr_token collision with another non-deleted table.
        while self.tables.find_by_qr_token(&table.qr_token).await?.is_some() {
            let events = table.handle(&TableCommand::RegenerateToken(RegenerateToken { now }))?;
            for e in &events {
                table.apply(e);
            }
        }

        self.tables.create(table).await
    }

    pub async fn get_table(&self, id: TableId, include_deleted: bool) -> DomainResult<Table> {
        self.tables.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_tables_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Table>> {
        self.get_event(event_id, include_deleted).await?;
        self.tables.list_by_event(event_id, include_deleted).await
    }

    pub async fn regenerate_table_token(&self, id: TableId, now: DateTime<Utc>) -> DomainResult<Table> {
        let mut table = self
            .tables
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let events = table.handle(&TableCommand::RegenerateToken(RegenerateToken { now }))?;
        for e in &events {
            table.apply(e);
        }
        while self.tables.find_by_qr_token(&table.qr_token).await?.is_some() {
            let events = table.handle(&TableCommand::RegenerateToken(RegenerateToken { now }))?;
            for e in &events {
                table.apply(e);
            }
        }
        self.tables.update(table).await
    }

    pub async fn soft_delete_table(&self, id: TableId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut table = self
            .tables
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let events = table.handle(&TableCommand::SoftDelete(SoftDeleteTable { now }))?;
        for e in &events {
            table.apply(e);
        }
        self.tables.update(table).await?;
        Ok(())
    }

    pub async fn create_seat(&self, table_id: TableId, seat_number: u32, now: DateTime<Utc>) -> DomainResult<Seat> {
        self.tables
            .find_by_id(table_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;

        if self.seats.find_by_seat_number(table_id, seat_number).await?.is_some() {
            return Err(DomainError::conflict("seat_number already in use for this table"));
        }

        let mut seat = Seat::empty(SeatId::new());
        let events = seat.handle(&SeatCommand::Create(CreateSeat {
            id: seat.id,
            table_id,
            seat_number,
            now,
        }))?;
        for e in &events {
            seat.apply(e);
        }
        self.seats.create(seat).await
    }

    pub async fn get_seat(&self, id: SeatId, include_deleted: bool) -> DomainResult<Seat> {
        self.seats.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_seats_by_table(&self, table_id: TableId, include_deleted: bool) -> DomainResult<Vec<Seat>> {
        self.tables.find_by_id(table_id, include_deleted).await?.ok_or_else(DomainError::not_found)?;
        self.seats.list_by_table(table_id, include_deleted).await
    }

    /// Look up the table minting a given QR token, for seat-token issuance.
    pub async fn find_table_by_qr_token(&self, qr_token: &str) -> DomainResult<Option<Table>> {
        self.tables.find_by_qr_token(qr_token).await
    }

    /// Look up a seat by its table and seat number, for seat-token issuance.
    pub async fn find_seat_by_number(&self, table_id: TableId, seat_number: u32) -> DomainResult<Option<Seat>> {
        self.seats.find_by_seat_number(table_id, seat_number).await
    }

    pub async fn soft_delete_seat(&self, id: SeatId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut seat = self
            .seats
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let events = seat.handle(&SeatCommand::SoftDelete(SoftDeleteSeat { now }))?;
        for e in &events {
            seat.apply(e);
        }
        self.seats.update(seat).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bbqjudge_core::{PageInfo, Pagination};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct InMemoryEvents(Mutex<HashMap<EventId, Event>>);

    #[async_trait]
    impl EventRepository for InMemoryEvents {
        async fn create(&self, event: Event) -> DomainResult<Event> {
            self.0.lock().unwrap().insert(event.id, event.clone());
            Ok(event)
        }
        async fn update(&self, event: Event) -> DomainResult<Event> {
            self.0.lock().unwrap().insert(event.id, event.clone());
            Ok(event)
        }
        async fn find_by_id(&self, id: EventId, include_deleted: bool) -> DomainResult<Option<Event>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|e| include_deleted || !e.is_deleted()))
        }
        async fn list(&self, _include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)> {
            let items: Vec<Event> = self.0.lock().unwrap().values().cloned().collect();
            Ok((items.clone(), PageInfo::new(pagination, items.len() as u64)))
        }
    }

    #[derive(Default)]
    struct InMemoryTables(Mutex<HashMap<TableId, Table>>);

    #[async_trait]
    impl TableRepository for InMemoryTables {
        async fn create(&self, table: Table) -> DomainResult<Table> {
            self.0.lock().unwrap().insert(table.id, table.clone());
            Ok(table)
        }
        async fn update(&self, table: Table) -> DomainResult<Table> {
            self.0.lock().unwrap().insert(table.id, table.clone());
            Ok(table)
        }
        async fn find_by_id(&self, id: TableId, include_deleted: bool) -> DomainResult<Option<Table>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|t| include_deleted || !t.is_deleted()))
        }
        async fn find_by_table_number(&self, event_id: EventId, table_number: u32) -> DomainResult<Option<Table>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|t| t.event_id == event_id && t.table_number == table_number && !t.is_deleted())
                .cloned())
        }
        async fn find_by_qr_token(&self, qr_token: &str) -> DomainResult<Option<Table>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|t| t.qr_token == qr_token && !t.is_deleted())
                .cloned())
        }
        async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Table>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .filter(|t| t.event_id == event_id && (include_deleted || !t.is_deleted()))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct InMemorySeats(Mutex<HashMap<SeatId, Seat>>);

    #[async_trait]
    impl SeatRepository for InMemorySeats {
        async fn create(&self, seat: Seat) -> DomainResult<Seat> {
            self.0.lock().unwrap().insert(seat.id, seat.clone());
            Ok(seat)
        }
        async fn update(&self, seat: Seat) -> DomainResult<Seat> {
            self.0.lock().unwrap().insert(seat.id, seat.clone());
            Ok(seat)
        }
        async fn find_by_id(&self, id: SeatId, include_deleted: bool) -> DomainResult<Option<Seat>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|s| include_deleted || !s.is_deleted()))
        }
        async fn find_by_seat_number(&self, table_id: TableId, seat_number: u32) -> DomainResult<Option<Seat>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|s| s.table_id == table_id && s.seat_number == seat_number && !s.is_deleted())
                .cloned())
        }
        async fn list_by_table(&self, table_id: TableId, include_deleted: bool) -> DomainResult<Vec<Seat>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.table_id == table_id && (include_deleted || !s.is_deleted()))
                .cloned()
                .collect())
        }
        async fn count_active_for_event(&self, _event_id: EventId) -> DomainResult<u32> {
            Ok(self.0.lock().unwrap().values().filter(|s| !s.is_deleted()).count() as u32)
        }
    }

    fn service() -> VenueService {
        VenueService::new(
            Arc::new(InMemoryEvents::default()),
            Arc::new(InMemoryTables::default()),
            Arc::new(InMemorySeats::default()),
        )
    }

    #[tokio::test]
    async fn create_event_then_table_then_seat() {
        let svc = service();
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(1)).unwrap();
        let event = svc
            .create_event(
                "Brisket Bash".into(),
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                None,
                scale,
                AggregationMethod::Mean,
                Utc::now(),
            )
            .await
            .unwrap();

        let table = svc.create_table(event.id, 1, Utc::now()).await.unwrap();
        assert_eq!(table.qr_token.len(), 64);

        let seat = svc.create_seat(table.id, 1, Utc::now()).await.unwrap();
        assert_eq!(seat.seat_number, 1);
    }

    #[tokio::test]
    async fn duplicate_table_number_conflicts() {
        let svc = service();
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(1)).unwrap();
        let event = svc
            .create_event(
                "Brisket Bash".into(),
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                None,
                scale,
                AggregationMethod::Mean,
                Utc::now(),
            )
            .await
            .unwrap();
        svc.create_table(event.id, 1, Utc::now()).await.unwrap();
        let err = svc.create_table(event.id, 1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn table_for_missing_event_is_not_found() {
        let svc = service();
        let err = svc.create_table(EventId::new(), 1, Utc::now()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn soft_deleted_table_frees_its_number_for_reuse() {
        let svc = service();
        let scale = ScoringScale::new(dec!(0), dec!(10), dec!(1)).unwrap();
        let event = svc
            .create_event(
                "Brisket Bash".into(),
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                None,
                scale,
                AggregationMethod::Mean,
                Utc::now(),
            )
            .await
            .unwrap();
        let table = svc.create_table(event.id, 1, Utc::now()).await.unwrap();
        svc.soft_delete_table(table.id, Utc::now()).await.unwrap();
        let recreated = svc.create_table(event.id, 1, Utc::now()).await.unwrap();
        assert_ne!(recreated.id, table.id);
    }
}
