//! The Table aggregate: a physical judging table within an Event, minting
//! its own QR token for seat-token issuance.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, DomainError, EventId, TableId};

/// 32 random bytes, hex-encoded.
pub fn mint_qr_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTable {
    pub id: TableId,
    pub event_id: EventId,
    pub table_number: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerateToken {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteTable {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableCommand {
    Create(CreateTable),
    RegenerateToken(RegenerateToken),
    SoftDelete(SoftDeleteTable),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCreated {
    pub id: TableId,
    pub event_id: EventId,
    pub table_number: u32,
    pub qr_token: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTokenRegenerated {
    pub qr_token: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableDomainEvent {
    Created(TableCreated),
    TokenRegenerated(TableTokenRegenerated),
    SoftDeleted(TableSoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub event_id: EventId,
    pub table_number: u32,
    pub qr_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Table {
    pub fn empty(id: TableId) -> Self {
        Self {
            id,
            event_id: EventId::new(),
            table_number: 0,
            qr_token: String::new(),
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

    /// Reconstruct an already-persisted `Table` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: TableId,
        event_id: EventId,
        table_number: u32,
        qr_token: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
        version: u64,
    ) -> Self {
        Self {
            id,
            event_id,
            table_number,
            qr_token,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Table {
    type Id = TableId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Table {
    type Command = TableCommand;
    type Event = TableDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TableCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("table already exists"));
                }
                if cmd.table_number == 0 {
                    return Err(DomainError::validation("table_number must be positive"));
                }
                Ok(vec![TableDomainEvent::Created(TableCreated {
                    id: cmd.id,
                    event_id: cmd.event_id,
                    table_number: cmd.table_number,
                    qr_token: mint_qr_token(),
                    now: cmd.now,
                })])
            }
            TableCommand::RegenerateToken(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                Ok(vec![TableDomainEvent::TokenRegenerated(TableTokenRegenerated {
                    qr_token: mint_qr_token(),
                    now: cmd.now,
                })])
            }
            TableCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("table already deleted"));
                }
                Ok(vec![TableDomainEvent::SoftDeleted(TableSoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TableDomainEvent::Created(e) => {
                self.id = e.id;
                self.event_id = e.event_id;
                self.table_number = e.table_number;
                self.qr_token = e.qr_token.clone();
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            TableDomainEvent::TokenRegenerated(e) => {
                self.qr_token = e.qr_token.clone();
                self.updated_at = e.now;
            }
            TableDomainEvent::SoftDeleted(e) => {
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
    fn create_mints_a_64_char_hex_token() {
        let mut table = Table::empty(TableId::new());
        let events = table
            .handle(&TableCommand::Create(CreateTable {
                id: table.id,
                event_id: EventId::new(),
                table_number: 3,
                now: Utc::now(),
            }))
            .unwrap();
        table.apply(&events[0]);
        assert_eq!(table.qr_token.len(), 64);
        assert!(table.qr_token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn regenerate_mints_a_different_token() {
        let mut table = Table::empty(TableId::new());
        let events = table
            .handle(&TableCommand::Create(CreateTable {
                id: table.id,
                event_id: EventId::new(),
                table_number: 1,
                now: Utc::now(),
            }))
            .unwrap();
        table.apply(&events[0]);
        let original = table.qr_token.clone();

        let events = table
            .handle(&TableCommand::RegenerateToken(RegenerateToken { now: Utc::now() }))
            .unwrap();
        table.apply(&events[0]);
        assert_ne!(table.qr_token, original);
    }

    #[test]
    fn zero_table_number_rejected() {
        let table = Table::empty(TableId::new());
        let err = table.handle(&TableCommand::Create(CreateTable {
            id: table.id,
            event_id: EventId::new(),
            table_number: 0,
            now: Utc::now(),
        }));
        assert!(err.is_err());
    }
}
