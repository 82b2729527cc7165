//! Postgres-backed repository for operator users.

use std::sync::Arc;

use sqlx::{PgPool, Row};

use bbqjudge_auth::roles::Role;
use bbqjudge_auth::user::{User, UserRepository};
use bbqjudge_core::{DomainResult, UserId};

use crate::error::map_sqlx_error;

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Operator => "operator",
    }
}

fn role_from_str(s: &str) -> Role {
    match s {
        "admin" => Role::Admin,
        _ => Role::Operator,
    }
}

fn row_to_user(row: sqlx::postgres::PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role_from_str(row.try_get::<String, _>("role")?.as_str()),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    #[tracing::instrument(skip(self, user), err)]
    async fn create(&self, user: User) -> DomainResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid().to_owned())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(role_to_str(user.role))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("users.create", e))?;
        Ok(user)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid().to_owned())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("users.find_by_id", e))?;
        row.map(row_to_user).transpose().map_err(|e| map_sqlx_error("users.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("users.find_by_username", e))?;
        row.map(row_to_user)
            .transpose()
            .map_err(|e| map_sqlx_error("users.find_by_username", e))
    }
}
