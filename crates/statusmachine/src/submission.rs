//! Submission lifecycle: `pending -> turned_in -> being_judged -> scored ->
//! finalized`. Entering `turned_in` stamps `turned_in_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    TurnedIn,
    BeingJudged,
    Scored,
    Finalized,
}

impl SubmissionStatus {
    fn next(self) -> Option<SubmissionStatus> {
        match self {
            SubmissionStatus::Pending => Some(SubmissionStatus::TurnedIn),
            SubmissionStatus::TurnedIn => Some(SubmissionStatus::BeingJudged),
            SubmissionStatus::BeingJudged => Some(SubmissionStatus::Scored),
            SubmissionStatus::Scored => Some(SubmissionStatus::Finalized),
            SubmissionStatus::Finalized => None,
        }
    }

    pub fn can_transition_to(self, target: SubmissionStatus) -> bool {
        self.next() == Some(target)
    }

    pub fn reachable_from(self) -> Vec<SubmissionStatus> {
        let mut out = Vec::new();
        let mut current = self;
        while let Some(next) = current.next() {
            out.push(next);
            current = next;
        }
        out
    }
}

/// Result of a successful [`transition`]: the new status, plus a
/// `turned_in_at` stamp when the transition entered `turned_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTransition {
    pub status: SubmissionStatus,
    pub turned_in_at: Option<DateTime<Utc>>,
}

/// Attempt a single adjacent transition. `now` is only consulted (and only
/// returned) when `target` is `turned_in`; callers should persist
/// `turned_in_at` only when it is `Some`.
pub fn transition(
    current: SubmissionStatus,
    target: SubmissionStatus,
    now: DateTime<Utc>,
) -> Result<SubmissionTransition, DomainError> {
    if !current.can_transition_to(target) {
        return Err(DomainError::invalid_status_transition(format!(
            "cannot transition submission from {current:?} to {target:?}"
        )));
    }

    let turned_in_at = (target == SubmissionStatus::TurnedIn).then_some(now);
    Ok(SubmissionTransition {
        status: target,
        turned_in_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn turn_in_stamps_timestamp() {
        let outcome = transition(SubmissionStatus::Pending, SubmissionStatus::TurnedIn, now()).unwrap();
        assert_eq!(outcome.status, SubmissionStatus::TurnedIn);
        assert_eq!(outcome.turned_in_at, Some(now()));
    }

    #[test]
    fn later_transitions_do_not_restamp() {
        let outcome = transition(SubmissionStatus::TurnedIn, SubmissionStatus::BeingJudged, now()).unwrap();
        assert_eq!(outcome.turned_in_at, None);
    }

    #[test]
    fn non_adjacent_transition_rejected() {
        assert!(transition(SubmissionStatus::Pending, SubmissionStatus::Scored, now()).is_err());
        assert!(transition(SubmissionStatus::Pending, SubmissionStatus::BeingJudged, now()).is_err());
    }

    #[test]
    fn backward_transition_rejected() {
        assert!(transition(SubmissionStatus::Scored, SubmissionStatus::TurnedIn, now()).is_err());
    }

    #[test]
    fn finalized_is_terminal() {
        assert!(SubmissionStatus::Finalized.reachable_from().is_empty());
    }

    #[test]
    fn transitive_closure_from_pending_is_full_chain() {
        assert_eq!(
            SubmissionStatus::Pending.reachable_from(),
            vec![
                SubmissionStatus::TurnedIn,
                SubmissionStatus::BeingJudged,
                SubmissionStatus::Scored,
                SubmissionStatus::Finalized,
            ]
        );
    }
}
