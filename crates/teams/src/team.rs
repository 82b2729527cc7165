//! The Team aggregate: a competing entry identified by a tamper-evident
//! barcode, minted fresh on create and on `invalidate-code`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_barcode::generate as generate_barcode;
use bbqjudge_core::{Aggregate, AggregateRoot, DomainError, EventId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeam {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub team_number: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub team_number: Option<u32>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidateTeamCode {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteTeam {
    pub now: DateTime<Utc>,
}

/// The domain commands the `Team` aggregate accepts. `Create` and
/// `InvalidateCode` carry the barcode secret explicitly: it is a
/// configuration input, not aggregate state, but the pure `handle` function
/// still needs it to mint a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamCommand {
    Create(CreateTeam),
    Update(UpdateTeam),
    InvalidateCode(InvalidateTeamCode),
    SoftDelete(SoftDeleteTeam),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCreated {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub team_number: u32,
    pub barcode_payload: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUpdated {
    pub name: String,
    pub team_number: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCodeInvalidated {
    pub barcode_payload: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamDomainEvent {
    Created(TeamCreated),
    Updated(TeamUpdated),
    CodeInvalidated(TeamCodeInvalidated),
    SoftDeleted(TeamSoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub team_number: u32,
    pub barcode_payload: String,
    pub code_invalidated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Team {
    pub fn empty(id: TeamId) -> Self {
        Self {
            id,
            event_id: EventId::new(),
            name: String::new(),
            team_number: 0,
            barcode_payload: String::new(),
            code_invalidated_at: None,
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

    /// Reconstruct an already-persisted `Team` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: TeamId,
        event_id: EventId,
        name: String,
        team_number: u32,
        barcode_payload: String,
        code_invalidated_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
        version: u64,
    ) -> Self {
        Self {
            id,
            event_id,
            name,
            team_number,
            barcode_payload,
            code_invalidated_at,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Team {
    type Id = TeamId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Team {
    type Command = TeamCommand;
    type Event = TeamDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TeamCommand::Create(_) => unreachable!("use handle_with_secret for Create"),
            TeamCommand::Update(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                let name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
                if name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                let team_number = cmd.team_number.unwrap_or(self.team_number);
                if team_number == 0 {
                    return Err(DomainError::validation("team_number must be positive"));
                }
                Ok(vec![TeamDomainEvent::Updated(TeamUpdated {
                    name,
                    team_number,
                    now: cmd.now,
                })])
            }
            TeamCommand::InvalidateCode(_) => unreachable!("use handle_with_secret for InvalidateCode"),
            TeamCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("team already deleted"));
                }
                Ok(vec![TeamDomainEvent::SoftDeleted(TeamSoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TeamDomainEvent::Created(e) => {
                self.id = e.id;
                self.event_id = e.event_id;
                self.name = e.name.clone();
                self.team_number = e.team_number;
                self.barcode_payload = e.barcode_payload.clone();
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            TeamDomainEvent::Updated(e) => {
                self.name = e.name.clone();
                self.team_number = e.team_number;
                self.updated_at = e.now;
            }
            TeamDomainEvent::CodeInvalidated(e) => {
                self.barcode_payload = e.barcode_payload.clone();
                self.code_invalidated_at = Some(e.now);
                self.updated_at = e.now;
            }
            TeamDomainEvent::SoftDeleted(e) => {
                self.deleted_at = Some(e.now);
                self.updated_at = e.now;
            }
        }
        self.version += 1;
    }
}

impl Team {
    /// `Create` and `InvalidateCode` mint a barcode, which needs the
    /// deployment's barcode secret. `handle` cannot take that extra
    /// parameter without breaking the `Aggregate` trait shape, so those two
    /// commands are handled here instead, alongside a passthrough to
    /// `handle` for the rest.
    pub fn handle_with_secret(
        &self,
        command: &TeamCommand,
        secret: &[u8],
    ) -> Result<Vec<TeamDomainEvent>, DomainError> {
        match command {
            TeamCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("team already exists"));
                }
                if cmd.name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                if cmd.team_number == 0 {
                    return Err(DomainError::validation("team_number must be positive"));
                }
                let barcode_payload = generate_barcode(cmd.event_id, cmd.id, secret);
                Ok(vec![TeamDomainEvent::Created(TeamCreated {
                    id: cmd.id,
                    event_id: cmd.event_id,
                    name: cmd.name.clone(),
                    team_number: cmd.team_number,
                    barcode_payload,
                    now: cmd.now,
                })])
            }
            TeamCommand::InvalidateCode(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                let barcode_payload = generate_barcode(self.event_id, self.id, secret);
                Ok(vec![TeamDomainEvent::CodeInvalidated(TeamCodeInvalidated {
                    barcode_payload,
                    now: cmd.now,
                })])
            }
            other => self.handle(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn create_mints_barcode() {
        let mut team = Team::empty(TeamId::new());
        let events = team
            .handle_with_secret(
                &TeamCommand::Create(CreateTeam {
                    id: team.id,
                    event_id: EventId::new(),
                    name: "Smoke Signals".into(),
                    team_number: 7,
                    now: Utc::now(),
                }),
                SECRET,
            )
            .unwrap();
        team.apply(&events[0]);
        assert!(!team.barcode_payload.is_empty());
        assert!(team.code_invalidated_at.is_none());
    }

    #[test]
    fn invalidate_code_mints_a_different_barcode_and_stamps_timestamp() {
        let mut team = Team::empty(TeamId::new());
        let events = team
            .handle_with_secret(
                &TeamCommand::Create(CreateTeam {
                    id: team.id,
                    event_id: EventId::new(),
                    name: "Smoke Signals".into(),
                    team_number: 7,
                    now: Utc::now(),
                }),
                SECRET,
            )
            .unwrap();
        team.apply(&events[0]);
        let original = team.barcode_payload.clone();

        let events = team
            .handle_with_secret(&TeamCommand::InvalidateCode(InvalidateTeamCode { now: Utc::now() }), SECRET)
            .unwrap();
        team.apply(&events[0]);
        assert_ne!(team.barcode_payload, original);
        assert!(team.code_invalidated_at.is_some());
    }

    #[test]
    fn zero_team_number_rejected() {
        let team = Team::empty(TeamId::new());
        let err = team.handle_with_secret(
            &TeamCommand::Create(CreateTeam {
                id: team.id,
                event_id: EventId::new(),
                name: "Smoke Signals".into(),
                team_number: 0,
                now: Utc::now(),
            }),
            SECRET,
        );
        assert!(err.is_err());
    }
}
