//! JWT claim shapes for the two principal kinds, and deterministic
//! time-window validation shared by both.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bbqjudge_core::{EventId, SeatId, TableId, UserId};

use crate::roles::Role;

pub const USER_TOKEN_TTL: Duration = Duration::hours(24);
pub const SEAT_TOKEN_TTL: Duration = Duration::minutes(90);

/// Claims carried by a user (operator) JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: UserId,
    pub role: Role,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl UserClaims {
    pub fn new(sub: UserId, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            sub,
            role,
            issued_at: now,
            expires_at: now + USER_TOKEN_TTL,
        }
    }
}

/// Claims carried by a seat (judge) JWT, scoped to one seat at one table
/// for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatClaims {
    pub event_id: EventId,
    pub table_id: TableId,
    pub seat_id: SeatId,
    pub seat_number: u32,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SeatClaims {
    pub fn new(
        event_id: EventId,
        table_id: TableId,
        seat_id: SeatId,
        seat_number: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            table_id,
            seat_id,
            seat_number,
            issued_at: now,
            expires_at: now + SEAT_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministic claims-only validation, shared by both claim kinds via the
/// identical `issued_at`/`expires_at` shape. Signature verification happens
/// separately in [`crate::jwt`].
pub fn validate_window(
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_claims_validate() {
        let now = Utc::now();
        let claims = UserClaims::new(UserId::new(), Role::Admin, now);
        assert!(validate_window(claims.issued_at, claims.expires_at, now).is_ok());
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let claims = UserClaims::new(UserId::new(), Role::Admin, now);
        let later = now + USER_TOKEN_TTL + Duration::seconds(1);
        assert_eq!(
            validate_window(claims.issued_at, claims.expires_at, later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn seat_claims_have_a_shorter_ttl() {
        let now = Utc::now();
        let claims = SeatClaims::new(EventId::new(), TableId::new(), SeatId::new(), 3, now);
        assert_eq!(claims.expires_at - claims.issued_at, SEAT_TOKEN_TTL);
    }
}
