//! The Seat aggregate: one judge position at a Table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, DomainError, SeatId, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSeat {
    pub id: SeatId,
    pub table_id: TableId,
    pub seat_number: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteSeat {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatCommand {
    Create(CreateSeat),
    SoftDelete(SoftDeleteSeat),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCreated {
    pub id: SeatId,
    pub table_id: TableId,
    pub seat_number: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatDomainEvent {
    Created(SeatCreated),
    SoftDeleted(SeatSoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub table_id: TableId,
    pub seat_number: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Seat {
    pub fn empty(id: SeatId) -> Self {
        Self {
            id,
            table_id: TableId::new(),
            seat_number: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            deleted_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Reconstruct an already-persisted `Seat` from its stored fields.
    pub fn hydrate(
        id: SeatId,
        table_id: TableId,
        seat_number: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
        version: u64,
    ) -> Self {
        Self {
            id,
            table_id,
            seat_number,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Seat {
    type Id = SeatId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Seat {
    type Command = SeatCommand;
    type Event = SeatDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SeatCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("seat already exists"));
                }
                if cmd.seat_number == 0 {
                    return Err(DomainError::validation("seat_number must be positive"));
                }
                Ok(vec![SeatDomainEvent::Created(SeatCreated {
                    id: cmd.id,
                    table_id: cmd.table_id,
                    seat_number: cmd.seat_number,
                    now: cmd.now,
                })])
            }
            SeatCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("seat already deleted"));
                }
                Ok(vec![SeatDomainEvent::SoftDeleted(SeatSoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SeatDomainEvent::Created(e) => {
                self.id = e.id;
                self.table_id = e.table_id;
                self.seat_number = e.seat_number;
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            SeatDomainEvent::SoftDeleted(e) => {
                self.deleted_at = Some(e.now);
                self.updated_at = e.now;
            }
        }
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_soft_delete() {
        let mut seat = Seat::empty(SeatId::new());
        let events = seat
            .handle(&SeatCommand::Create(CreateSeat {
                id: seat.id,
                table_id: TableId::new(),
                seat_number: 4,
                now: Utc::now(),
            }))
            .unwrap();
        seat.apply(&events[0]);
        assert_eq!(seat.seat_number, 4);
        assert!(!seat.is_deleted());

        let events = seat
            .handle(&SeatCommand::SoftDelete(SoftDeleteSeat { now: Utc::now() }))
            .unwrap();
        seat.apply(&events[0]);
        assert!(seat.is_deleted());
    }

    #[test]
    fn zero_seat_number_rejected() {
        let seat = Seat::empty(SeatId::new());
        assert!(seat
            .handle(&SeatCommand::Create(CreateSeat {
                id: seat.id,
                table_id: TableId::new(),
                seat_number: 0,
                now: Utc::now(),
            }))
            .is_err());
    }
}
