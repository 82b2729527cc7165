//! `TeamsService`: CRUD + invariants over Team, plus barcode verification
//! against a persisted team's current (possibly invalidated) payload.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bbqjudge_barcode::{self, VerifyOutcome};
use bbqjudge_core::{Aggregate, DomainError, DomainResult, EventId, TeamId};
use bbqjudge_venue::EventRepository;

use crate::repo::TeamRepository;
use crate::team::{CreateTeam, InvalidateTeamCode, SoftDeleteTeam, Team, TeamCommand, UpdateTeam};

pub struct NewTeam {
    pub name: String,
    pub team_number: u32,
}

/// Outcome of a barcode verification request: signature validity plus
/// whatever store-side facts (team, invalidation, event mismatch) the
/// codec's own `VerifyOutcome` cannot know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeVerification {
    pub valid: bool,
    pub team: Option<Team>,
    pub error: Option<String>,
}

pub struct TeamsService {
    events: Arc<dyn EventRepository>,
    teams: Arc<dyn TeamRepository>,
    barcode_secret: Vec<u8>,
}

impl TeamsService {
    pub fn new(events: Arc<dyn EventRepository>, teams: Arc<dyn TeamRepository>, barcode_secret: Vec<u8>) -> Self {
        Self { events, teams, barcode_secret }
    }

    async fn require_event(&self, event_id: EventId) -> DomainResult<()> {
        self.events
            .find_by_id(event_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        Ok(())
    }

    pub async fn create_team(
        &self,
        event_id: EventId,
        name: String,
        team_number: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Team> {
        self.require_event(event_id).await?;
        if self.teams.find_by_team_number(event_id, team_number).await?.is_some() {
            return Err(DomainError::conflict("team_number already in use for this event"));
        }
        let mut team = Team::empty(TeamId::new());
        let events = team.handle_with_secret(
            &TeamCommand::Create(CreateTeam { id: team.id, event_id, name, team_number, now }),
            &self.barcode_secret,
        )?;
        for e in &events {
            team.apply(e);
        }
        self.teams.create(team).await
    }

    pub async fn bulk_create_teams(
        &self,
        event_id: EventId,
        items: Vec<NewTeam>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Team>> {
        self.require_event(event_id).await?;

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.team_number) {
                return Err(DomainError::conflict(format!(
                    "duplicate team_number {} within request",
                    item.team_number
                )));
            }
        }
        for item in &items {
            if self.teams.find_by_team_number(event_id, item.team_number).await?.is_some() {
                return Err(DomainError::conflict(format!(
                    "team_number {} already in use for this event",
                    item.team_number
                )));
            }
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let mut team = Team::empty(TeamId::new());
            let events = team.handle_with_secret(
                &TeamCommand::Create(CreateTeam {
                    id: team.id,
                    event_id,
                    name: item.name,
                    team_number: item.team_number,
                    now,
                }),
                &self.barcode_secret,
            )?;
            for e in &events {
                team.apply(e);
            }
            created.push(self.teams.create(team).await?);
        }
        Ok(created)
    }

    pub async fn get_team(&self, id: TeamId, include_deleted: bool) -> DomainResult<Team> {
        self.teams.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_teams_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Team>> {
        self.require_event(event_id).await?;
        self.teams.list_by_event(event_id, include_deleted).await
    }

    pub async fn update_team(&self, id: TeamId, update: UpdateTeam) -> DomainResult<Team> {
        let mut team = self.teams.find_by_id(id, false).await?.ok_or_else(DomainError::not_found)?;
        if let Some(new_number) = update.team_number {
            if let Some(existing) = self.teams.find_by_team_number(team.event_id, new_number).await? {
                if existing.id != id {
                    return Err(DomainError::conflict("team_number already in use for this event"));
                }
            }
        }
        let events = team.handle(&TeamCommand::Update(update))?;
        for e in &events {
            team.apply(e);
        }
        self.teams.update(team).await
    }

    pub async fn invalidate_code(&self, id: TeamId, now: DateTime<Utc>) -> DomainResult<Team> {
        let mut team = self.teams.find_by_id(id, false).await?.ok_or_else(DomainError::not_found)?;
        let events = team.handle_with_secret(
            &TeamCommand::InvalidateCode(InvalidateTeamCode { now }),
            &self.barcode_secret,
        )?;
        for e in &events {
            team.apply(e);
        }
        self.teams.update(team).await
    }

    pub async fn soft_delete_team(&self, id: TeamId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut team = self.teams.find_by_id(id, false).await?.ok_or_else(DomainError::not_found)?;
        let events = team.handle(&TeamCommand::SoftDelete(SoftDeleteTeam { now }))?;
        for e in &events {
            team.apply(e);
        }
        self.teams.update(team).await?;
        Ok(())
    }

    /// Verifies a scanned payload's signature, then cross-checks it against
    /// the team currently on file: a payload that verifies cryptographically
    /// but no longer matches the team's stored `barcode_payload` (because the
    /// code was invalidated and reissued) is treated as invalid.
    pub async fn verify_barcode(
        &self,
        payload: &str,
        event_id_hint: Option<EventId>,
    ) -> DomainResult<BarcodeVerification> {
        if bbqjudge_barcode::is_legacy(payload) {
            return Ok(BarcodeVerification {
                valid: false,
                team: None,
                error: Some("legacy barcodes cannot be re-verified".to_string()),
            });
        }

        let outcome: VerifyOutcome = bbqjudge_barcode::verify(payload, &self.barcode_secret);
        if !outcome.valid {
            return Ok(BarcodeVerification { valid: false, team: None, error: outcome.error });
        }

        let team_id = outcome.team_id.expect("verified outcomes carry a team id");
        let team = match self.teams.find_by_id(team_id, false).await? {
            Some(team) => team,
            None => {
                return Ok(BarcodeVerification {
                    valid: false,
                    team: None,
                    error: Some("team not found".to_string()),
                })
            }
        };

        if let Some(hint) = event_id_hint {
            if hint != team.event_id {
                return Ok(BarcodeVerification {
                    valid: false,
                    team: None,
                    error: Some("barcode does not belong to this event".to_string()),
                });
            }
        }

        if team.barcode_payload != payload {
            return Ok(BarcodeVerification {
                valid: false,
                team: None,
                error: Some("barcode has been invalidated".to_string()),
            });
        }

        Ok(BarcodeVerification { valid: true, team: Some(team), error: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bbqjudge_core::{PageInfo, Pagination};
    use bbqjudge_venue::Event;

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
        async fn find_by_id(&self, id: EventId, _include_deleted: bool) -> DomainResult<Option<Event>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn list(&self, _include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)> {
            let items: Vec<Event> = self.0.lock().unwrap().values().cloned().collect();
            Ok((items.clone(), PageInfo::new(pagination, items.len() as u64)))
        }
    }

    #[derive(Default)]
    struct InMemoryTeams(Mutex<HashMap<TeamId, Team>>);

    #[async_trait]
    impl TeamRepository for InMemoryTeams {
        async fn create(&self, team: Team) -> DomainResult<Team> {
            self.0.lock().unwrap().insert(team.id, team.clone());
            Ok(team)
        }
        async fn update(&self, team: Team) -> DomainResult<Team> {
            self.0.lock().unwrap().insert(team.id, team.clone());
            Ok(team)
        }
        async fn find_by_id(&self, id: TeamId, include_deleted: bool) -> DomainResult<Option<Team>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|t| include_deleted || !t.is_deleted()))
        }
        async fn find_by_team_number(&self, event_id: EventId, team_number: u32) -> DomainResult<Option<Team>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|t| t.event_id == event_id && t.team_number == team_number && !t.is_deleted())
                .cloned())
        }
        async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Team>> {
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

    async fn seeded_event(events: &InMemoryEvents) -> EventId {
        let event = Event::empty(EventId::new());
        let id = event.id;
        events.0.lock().unwrap().insert(id, event);
        id
    }

    fn service(events: Arc<InMemoryEvents>, teams: Arc<InMemoryTeams>) -> TeamsService {
        TeamsService::new(events, teams, b"test-secret".to_vec())
    }

    #[tokio::test]
    async fn duplicate_team_number_conflicts() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let teams = Arc::new(InMemoryTeams::default());
        let svc = service(events, teams);
        svc.create_team(event_id, "A".into(), 1, Utc::now()).await.unwrap();
        let err = svc.create_team(event_id, "B".into(), 1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn verify_barcode_round_trip() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let teams = Arc::new(InMemoryTeams::default());
        let svc = service(events, teams);
        let team = svc.create_team(event_id, "Smoke Signals".into(), 1, Utc::now()).await.unwrap();

        let result = svc.verify_barcode(&team.barcode_payload, Some(event_id)).await.unwrap();
        assert!(result.valid);
        assert_eq!(result.team.unwrap().id, team.id);
    }

    #[tokio::test]
    async fn invalidated_code_no_longer_verifies() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let teams = Arc::new(InMemoryTeams::default());
        let svc = service(events, teams);
        let team = svc.create_team(event_id, "Smoke Signals".into(), 1, Utc::now()).await.unwrap();
        let old_payload = team.barcode_payload.clone();

        svc.invalidate_code(team.id, Utc::now()).await.unwrap();

        let result = svc.verify_barcode(&old_payload, None).await.unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn event_mismatch_rejected() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let other_event_id = seeded_event(&events).await;
        let teams = Arc::new(InMemoryTeams::default());
        let svc = service(events, teams);
        let team = svc.create_team(event_id, "Smoke Signals".into(), 1, Utc::now()).await.unwrap();

        let result = svc.verify_barcode(&team.barcode_payload, Some(other_event_id)).await.unwrap();
        assert!(!result.valid);
    }
}
