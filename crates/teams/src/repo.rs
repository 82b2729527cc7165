//! Repository abstraction for Team.

use async_trait::async_trait;

use bbqjudge_core::{DomainResult, EventId, TeamId};

use crate::team::Team;

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, team: Team) -> DomainResult<Team>;
    async fn update(&self, team: Team) -> DomainResult<Team>;
    async fn find_by_id(&self, id: TeamId, include_deleted: bool) -> DomainResult<Option<Team>>;
    async fn find_by_team_number(&self, event_id: EventId, team_number: u32) -> DomainResult<Option<Team>>;
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Team>>;
}
