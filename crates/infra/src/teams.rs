//! Postgres-backed repository for Team.

use std::sync::Arc;

use sqlx::{PgPool, Row};

use bbqjudge_core::{AggregateRoot, DomainResult, EventId, TeamId};
use bbqjudge_teams::repo::TeamRepository;
use bbqjudge_teams::team::Team;

use crate::error::map_sqlx_error;

fn row_to_team(row: sqlx::postgres::PgRow) -> Result<Team, sqlx::Error> {
    Ok(Team::hydrate(
        TeamId::from_uuid(row.try_get("id")?),
        EventId::from_uuid(row.try_get("event_id")?),
        row.try_get("name")?,
        row.try_get::<i32, _>("team_number")? as u32,
        row.try_get("barcode_payload")?,
        row.try_get("code_invalidated_at")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgTeamRepository {
    pool: Arc<PgPool>,
}

impl PgTeamRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TeamRepository for PgTeamRepository {
    #[tracing::instrument(skip(self, team), err)]
    async fn create(&self, team: Team) -> DomainResult<Team> {
        sqlx::query(
            r#"
            INSERT INTO teams
                (id, event_id, name, team_number, barcode_payload, code_invalidated_at,
                 created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(team.id.as_uuid().to_owned())
        .bind(team.event_id.as_uuid().to_owned())
        .bind(&team.name)
        .bind(team.team_number as i32)
        .bind(&team.barcode_payload)
        .bind(team.code_invalidated_at)
        .bind(team.created_at)
        .bind(team.updated_at)
        .bind(team.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("teams.create", e))?;
        Ok(team)
    }

    #[tracing::instrument(skip(self, team), err)]
    async fn update(&self, team: Team) -> DomainResult<Team> {
        sqlx::query(
            r#"
            UPDATE teams SET
                name = $2, team_number = $3, barcode_payload = $4, code_invalidated_at = $5,
                updated_at = $6, deleted_at = $7, version = $8
            WHERE id = $1
            "#,
        )
        .bind(team.id.as_uuid().to_owned())
        .bind(&team.name)
        .bind(team.team_number as i32)
        .bind(&team.barcode_payload)
        .bind(team.code_invalidated_at)
        .bind(team.updated_at)
        .bind(team.deleted_at)
        .bind(team.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("teams.update", e))?;
        Ok(team)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: TeamId, include_deleted: bool) -> DomainResult<Option<Team>> {
        let row = sqlx::query("SELECT * FROM teams WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("teams.find_by_id", e))?;
        row.map(row_to_team).transpose().map_err(|e| map_sqlx_error("teams.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_team_number(&self, event_id: EventId, team_number: u32) -> DomainResult<Option<Team>> {
        let row = sqlx::query(
            "SELECT * FROM teams WHERE event_id = $1 AND team_number = $2 AND deleted_at IS NULL",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(team_number as i32)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("teams.find_by_team_number", e))?;
        row.map(row_to_team).transpose().map_err(|e| map_sqlx_error("teams.find_by_team_number", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Team>> {
        let rows = sqlx::query(
            "SELECT * FROM teams WHERE event_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY team_number ASC",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("teams.list_by_event", e))?;
        rows.into_iter()
            .map(row_to_team)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("teams.list_by_event", e))
    }
}
