//! The Criterion aggregate: a scoring dimension (e.g. Taste) with a weight.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, CriterionId, DomainError, EventId};

fn default_weight() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCriterion {
    pub id: CriterionId,
    pub event_id: EventId,
    pub name: String,
    pub weight: Option<Decimal>,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCriterion {
    pub name: Option<String>,
    pub weight: Option<Decimal>,
    pub sort_order: Option<i32>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteCriterion {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionCommand {
    Create(CreateCriterion),
    Update(UpdateCriterion),
    SoftDelete(SoftDeleteCriterion),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionCreated {
    pub id: CriterionId,
    pub event_id: EventId,
    pub name: String,
    pub weight: Decimal,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionUpdated {
    pub name: String,
    pub weight: Decimal,
    pub sort_order: i32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionDomainEvent {
    Created(CriterionCreated),
    Updated(CriterionUpdated),
    SoftDeleted(CriterionSoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub event_id: EventId,
    pub name: String,
    pub weight: Decimal,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Criterion {
    pub fn empty(id: CriterionId) -> Self {
        Self {
            id,
            event_id: EventId::new(),
            name: String::new(),
            weight: default_weight(),
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

    /// Reconstruct an already-persisted `Criterion` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: CriterionId,
        event_id: EventId,
        name: String,
        weight: Decimal,
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
            weight,
            sort_order,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Criterion {
    type Id = CriterionId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Criterion {
    type Command = CriterionCommand;
    type Event = CriterionDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CriterionCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("criterion already exists"));
                }
                if cmd.name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                let weight = cmd.weight.unwrap_or_else(default_weight);
                if weight < Decimal::ZERO {
                    return Err(DomainError::validation("weight must be >= 0"));
                }
                Ok(vec![CriterionDomainEvent::Created(CriterionCreated {
                    id: cmd.id,
                    event_id: cmd.event_id,
                    name: cmd.name.clone(),
                    weight,
                    sort_order: cmd.sort_order,
                    now: cmd.now,
                })])
            }
            CriterionCommand::Update(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                let name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
                if name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                let weight = cmd.weight.unwrap_or(self.weight);
                if weight < Decimal::ZERO {
                    return Err(DomainError::validation("weight must be >= 0"));
                }
                let sort_order = cmd.sort_order.unwrap_or(self.sort_order);
                Ok(vec![CriterionDomainEvent::Updated(CriterionUpdated {
                    name,
                    weight,
                    sort_order,
                    now: cmd.now,
                })])
            }
            CriterionCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("criterion already deleted"));
                }
                Ok(vec![CriterionDomainEvent::SoftDeleted(CriterionSoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CriterionDomainEvent::Created(e) => {
                self.id = e.id;
                self.event_id = e.event_id;
                self.name = e.name.clone();
                self.weight = e.weight;
                self.sort_order = e.sort_order;
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            CriterionDomainEvent::Updated(e) => {
                self.name = e.name.clone();
                self.weight = e.weight;
                self.sort_order = e.sort_order;
                self.updated_at = e.now;
            }
            CriterionDomainEvent::SoftDeleted(e) => {
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
    use rust_decimal_macros::dec;

    #[test]
    fn create_defaults_weight_to_one() {
        let mut criterion = Criterion::empty(CriterionId::new());
        let events = criterion
            .handle(&CriterionCommand::Create(CreateCriterion {
                id: criterion.id,
                event_id: EventId::new(),
                name: "Taste".into(),
                weight: None,
                sort_order: 0,
                now: Utc::now(),
            }))
            .unwrap();
        criterion.apply(&events[0]);
        assert_eq!(criterion.weight, dec!(1));
    }

    #[test]
    fn negative_weight_rejected() {
        let criterion = Criterion::empty(CriterionId::new());
        assert!(criterion
            .handle(&CriterionCommand::Create(CreateCriterion {
                id: criterion.id,
                event_id: EventId::new(),
                name: "Taste".into(),
                weight: Some(dec!(-1)),
                sort_order: 0,
                now: Utc::now(),
            }))
            .is_err());
    }
}
