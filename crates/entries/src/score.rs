//! The Score aggregate: one judge's (seat's) rating of one Submission
//! against one Criterion, in one phase. Scores are never soft-deleted;
//! removal is a hard delete performed directly by the repository, gated
//! admin-only at the service layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bbqjudge_core::{Aggregate, AggregateRoot, CriterionId, DomainError, ScoreId, SeatId, SubmissionId};

use crate::phase::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScore {
    pub id: ScoreId,
    pub submission_id: SubmissionId,
    pub seat_id: SeatId,
    pub criterion_id: CriterionId,
    pub phase: Phase,
    pub score_value: Decimal,
    pub comment: Option<String>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateScore {
    pub score_value: Option<Decimal>,
    pub comment: Option<Option<String>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreCommand {
    Create(CreateScore),
    Update(UpdateScore),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCreated {
    pub id: ScoreId,
    pub submission_id: SubmissionId,
    pub seat_id: SeatId,
    pub criterion_id: CriterionId,
    pub phase: Phase,
    pub score_value: Decimal,
    pub comment: Option<String>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdated {
    pub score_value: Decimal,
    pub comment: Option<String>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreDomainEvent {
    Created(ScoreCreated),
    Updated(ScoreUpdated),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: ScoreId,
    pub submission_id: SubmissionId,
    pub seat_id: SeatId,
    pub criterion_id: CriterionId,
    pub phase: Phase,
    pub score_value: Decimal,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    version: u64,
    created: bool,
}

impl Score {
    pub fn empty(id: ScoreId) -> Self {
        Self {
            id,
            submission_id: SubmissionId::new(),
            seat_id: SeatId::new(),
            criterion_id: CriterionId::new(),
            phase: Phase::Appearance,
            score_value: Decimal::ZERO,
            comment: None,
            submitted_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            version: 0,
            created: false,
        }
    }

    /// Reconstruct an already-persisted `Score` from its stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ScoreId,
        submission_id: SubmissionId,
        seat_id: SeatId,
        criterion_id: CriterionId,
        phase: Phase,
        score_value: Decimal,
        comment: Option<String>,
        submitted_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u64,
    ) -> Self {
        Self {
            id,
            submission_id,
            seat_id,
            criterion_id,
            phase,
            score_value,
            comment,
            submitted_at,
            updated_at,
            version,
            created: true,
        }
    }
}

impl AggregateRoot for Score {
    type Id = ScoreId;
    fn id(&self) -> &Self::Id {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Score {
    type Command = ScoreCommand;
    type Event = ScoreDomainEvent;
    type Error = DomainError;

    /// Score-value/step validation against the owning Event's scale happens
    /// in `EntriesService`, which alone has access to the scale; this
    /// `handle` only enforces shape invariants local to the aggregate.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ScoreCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("score already exists"));
                }
                Ok(vec![ScoreDomainEvent::Created(ScoreCreated {
                    id: cmd.id,
                    submission_id: cmd.submission_id,
                    seat_id: cmd.seat_id,
                    criterion_id: cmd.criterion_id,
                    phase: cmd.phase,
                    score_value: cmd.score_value,
                    comment: cmd.comment.clone(),
                    now: cmd.now,
                })])
            }
            ScoreCommand::Update(cmd) => {
                if !self.created {
                    return Err(DomainError::not_found());
                }
                let score_value = cmd.score_value.unwrap_or(self.score_value);
                let comment = cmd.comment.clone().unwrap_or_else(|| self.comment.clone());
                Ok(vec![ScoreDomainEvent::Updated(ScoreUpdated {
                    score_value,
                    comment,
                    now: cmd.now,
                })])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ScoreDomainEvent::Created(e) => {
                self.id = e.id;
                self.submission_id = e.submission_id;
                self.seat_id = e.seat_id;
                self.criterion_id = e.criterion_id;
                self.phase = e.phase;
                self.score_value = e.score_value;
                self.comment = e.comment.clone();
                self.submitted_at = e.now;
                self.updated_at = e.now;
                self.created = true;
            }
            ScoreDomainEvent::Updated(e) => {
                self.score_value = e.score_value;
                self.comment = e.comment.clone();
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
    fn create_then_update_score_value() {
        let mut score = Score::empty(ScoreId::new());
        let events = score
            .handle(&ScoreCommand::Create(CreateScore {
                id: score.id,
                submission_id: SubmissionId::new(),
                seat_id: SeatId::new(),
                criterion_id: CriterionId::new(),
                phase: Phase::Appearance,
                score_value: dec!(8.5),
                comment: None,
                now: Utc::now(),
            }))
            .unwrap();
        score.apply(&events[0]);

        let events = score
            .handle(&ScoreCommand::Update(UpdateScore {
                score_value: Some(dec!(9.0)),
                comment: Some(Some("nice bark".into())),
                now: Utc::now(),
            }))
            .unwrap();
        score.apply(&events[0]);
        assert_eq!(score.score_value, dec!(9.0));
        assert_eq!(score.comment.as_deref(), Some("nice bark"));
    }

    #[test]
    fn double_create_conflicts() {
        let mut score = Score::empty(ScoreId::new());
        let events = score
            .handle(&ScoreCommand::Create(CreateScore {
                id: score.id,
                submission_id: SubmissionId::new(),
                seat_id: SeatId::new(),
                criterion_id: CriterionId::new(),
                phase: Phase::TasteTexture,
                score_value: dec!(7),
                comment: None,
                now: Utc::now(),
            }))
            .unwrap();
        score.apply(&events[0]);
        let err = score.handle(&ScoreCommand::Create(CreateScore {
            id: score.id,
            submission_id: SubmissionId::new(),
            seat_id: SeatId::new(),
            criterion_id: CriterionId::new(),
            phase: Phase::TasteTexture,
            score_value: dec!(7),
            comment: None,
            now: Utc::now(),
        }));
        assert!(err.is_err());
    }
}
