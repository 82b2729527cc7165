//! The Category aggregate: a meat class (e.g. Brisket) within an Event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, CategoryId, DomainError, EventId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub id: CategoryId,
    pub event_id: EventId,
    pub name: String,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteCategory {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryCommand {
    Create(CreateCategory),
    Update(UpdateCategory),
    SoftDelete(SoftDeleteCategory),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreated {
    pub id: CategoryId,
    pub event_id: EventId,
    pub name: String,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdated {
    pub name: String,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryDomainEvent {
    Created(CategoryCreated),
    Updated(CategoryUpdated),
    SoftDeleted(CategorySoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub event_id: EventId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Category {
    pub fn empty(id: CategoryId) -> Self {
        Self {
            id,
            event_id: EventId::new(),
            name: String::new(),
            sort_order: 0,
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

    /// Reconstruct an already-persisted `Category` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: CategoryId,
        event_id: EventId,
        name: String,
        sort_order: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
        version: u64,
    ) -> Self {
        Self {
            id,
            event_id,
            name,
            sort_order,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Category {
    type Id = CategoryId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Category {
    type Command = CategoryCommand;
    type Event = CategoryDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CategoryCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("category already exists"));
                }
                if cmd.name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                Ok(vec![CategoryDomainEvent::Created(CategoryCreated {
                    id: cmd.id,
                    event_id: cmd.event_id,
                    name: cmd.name.clone(),
                    sort_order: cmd.sort_order,
                    now: cmd.now,
                })])
            }
            CategoryCommand::Update(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                let name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
                if name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                let sort_order = cmd.sort_order.unwrap_or(self.sort_order);
                Ok(vec![CategoryDomainEvent::Updated(CategoryUpdated {
                    name,
                    sort_order,
                    now: cmd.now,
                })])
            }
            CategoryCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("category already deleted"));
                }
                Ok(vec![CategoryDomainEvent::SoftDeleted(CategorySoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CategoryDomainEvent::Created(e) => {
                self.id = e.id;
                self.event_id = e.event_id;
                self.name = e.name.clone();
                self.sort_order = e.sort_order;
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            CategoryDomainEvent::Updated(e) => {
                self.name = e.name.clone();
                self.sort_order = e.sort_order;
                self.updated_at = e.now;
            }
            CategoryDomainEvent::SoftDeleted(e) => {
                self.deleted_at = Some(e.now);
                self.updated_at = e.now;
            }
        }
        self.version += 1;
    }
}
