//! Event lifecycle: `draft -> active -> finalized -> archived`. No backward
//! transitions, no skips.

use serde::{Deserialize, Serialize};

use bbqjudge_core::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Active,
    Finalized,
    Archived,
}

impl EventStatus {
    /// The single status this one may advance to, or `None` if terminal.
    fn next(self) -> Option<EventStatus> {
        match self {
            EventStatus::Draft => Some(EventStatus::Active),
            EventStatus::Active => Some(EventStatus::Finalized),
            EventStatus::Finalized => Some(EventStatus::Archived),
            EventStatus::Archived => None,
        }
    }

    /// Whether moving directly from `self` to `target` is a legal, single
    /// adjacent step.
    pub fn can_transition_to(self, target: EventStatus) -> bool {
        self.next() == Some(target)
    }

    /// Attempt the transition, returning the new status or a typed error
    /// leaving the caller free to discard the attempted write.
    pub fn transition(self, target: EventStatus) -> Result<EventStatus, DomainError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(DomainError::invalid_status_transition(format!(
                "cannot transition event from {self:?} to {target:?}"
            )))
        }
    }

    /// All statuses reachable from `self` via zero or more adjacent steps,
    /// in order, excluding `self`.
    pub fn reachable_from(self) -> Vec<EventStatus> {
        let mut out = Vec::new();
        let mut current = self;
        while let Some(next) = current.next() {
            out.push(next);
            current = next;
        }
        out
    }
}
