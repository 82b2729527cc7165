//! The operator user: a username/password/role triple, persisted as a
//! single current-state row per [`crate::claims::UserClaims`]'s `sub`.
//!
//! Users are not part of the event-scoped domain model; they exist purely
//! to back operator login and are global to the deployment, not scoped to
//! an event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bbqjudge_core::{DomainError, DomainResult, UserId};

use crate::password::{hash_password, verify_password};
use crate::roles::Role;

/// A registered operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user, hashing `plaintext_password` immediately. Never
    /// construct a `User` from a plaintext password any other way.
    pub fn register(
        username: impl Into<String>,
        plaintext_password: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if plaintext_password.len() < 8 {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }
        let password_hash = hash_password(plaintext_password)
            .map_err(|e| DomainError::validation(format!("could not hash password: {e}")))?;
        Ok(Self {
            id: UserId::new(),
            username,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Verify a login attempt's plaintext password against the stored hash.
    pub fn verify_password(&self, plaintext_password: &str) -> bool {
        verify_password(plaintext_password, &self.password_hash).unwrap_or(false)
    }
}

/// Storage access for operator users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> DomainResult<User>;
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
}
