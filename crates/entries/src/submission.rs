//! The Submission aggregate: a Team's entry in a Category, progressing
//! through the judging lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, CategoryId, DomainError, SubmissionId, TeamId};
use bbqjudge_statusmachine::{transition_submission, SubmissionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubmission {
    pub id: SubmissionId,
    pub team_id: TeamId,
    pub category_id: CategoryId,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceSubmission {
    pub target: SubmissionStatus,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteSubmission {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionCommand {
    Create(CreateSubmission),
    Advance(AdvanceSubmission),
    SoftDelete(SoftDeleteSubmission),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCreated {
    pub id: SubmissionId,
    pub team_id: TeamId,
    pub category_id: CategoryId,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAdvanced {
    pub status: SubmissionStatus,
    pub turned_in_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSoftDeleted {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionDomainEvent {
    Created(SubmissionCreated),
    Advanced(SubmissionAdvanced),
    SoftDeleted(SubmissionSoftDeleted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub team_id: TeamId,
    pub category_id: CategoryId,
    pub status: SubmissionStatus,
    pub turned_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Submission {
    pub fn empty(id: SubmissionId) -> Self {
        Self {
            id,
            team_id: TeamId::new(),
            category_id: CategoryId::new(),
            status: SubmissionStatus::Pending,
            turned_in_at: None,
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

    /// Reconstruct an already-persisted `Submission` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: SubmissionId,
        team_id: TeamId,
        category_id: CategoryId,
        status: SubmissionStatus,
        turned_in_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
        version: u64,
    ) -> Self {
        Self {
            id,
            team_id,
            category_id,
            status,
            turned_in_at,
            created_at,
            updated_at,
            deleted_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Submission {
    type Id = SubmissionId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Submission {
    type Command = SubmissionCommand;
    type Event = SubmissionDomainEvent;
    type Error = DomainError;

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SubmissionCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("submission already exists"));
                }
                Ok(vec![SubmissionDomainEvent::Created(SubmissionCreated {
                    id: cmd.id,
                    team_id: cmd.team_id,
                    category_id: cmd.category_id,
                    now: cmd.now,
                })])
            }
            SubmissionCommand::Advance(cmd) => {
                if !self.created || self.is_deleted() {
                    return Err(DomainError::not_found());
                }
                let outcome = transition_submission(self.status, cmd.target, cmd.now)?;
                Ok(vec![SubmissionDomainEvent::Advanced(SubmissionAdvanced {
                    status: outcome.status,
                    turned_in_at: outcome.turned_in_at,
                    now: cmd.now,
                })])
            }
            SubmissionCommand::SoftDelete(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                if self.is_deleted() {
                    return Err(DomainError::conflict("submission already deleted"));
                }
                Ok(vec![SubmissionDomainEvent::SoftDeleted(SubmissionSoftDeleted { now: cmd.now })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SubmissionDomainEvent::Created(e) => {
                self.id = e.id;
                self.team_id = e.team_id;
                self.category_id = e.category_id;
                self.status = SubmissionStatus::Pending;
                self.created_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            SubmissionDomainEvent::Advanced(e) => {
                self.status = e.status;
                if e.turned_in_at.is_some() {
                    self.turned_in_at = e.turned_in_at;
                }
                self.updated_at = e.now;
            }
            SubmissionDomainEvent::SoftDeleted(e) => {
                self.deleted_at = Some(e.now);
                self.updated_at = e.now;
            }
        }
        self.version += 1;
    }
}
