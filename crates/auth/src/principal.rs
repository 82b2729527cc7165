//! The resolved identity of an authenticated request: either an operator
//! user or a seat (judge), never both and never neither.

use chrono::{DateTime, Utc};

use bbqjudge_core::{EventId, SeatId, TableId, UserId};

use crate::claims::{SeatClaims, TokenValidationError, UserClaims};
use crate::jwt::{SeatJwt, UserJwt};
use crate::roles::Role;

/// A fully resolved principal for authorization decisions downstream of
/// token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User { user_id: UserId, role: Role },
    Seat {
        event_id: EventId,
        table_id: TableId,
        seat_id: SeatId,
        seat_number: u32,
    },
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::User { role: Role::Admin, .. })
    }

    pub fn as_seat(&self) -> Option<SeatId> {
        match self {
            Principal::Seat { seat_id, .. } => Some(*seat_id),
            Principal::User { .. } => None,
        }
    }
}

impl From<UserClaims> for Principal {
    fn from(claims: UserClaims) -> Self {
        Principal::User {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

impl From<SeatClaims> for Principal {
    fn from(claims: SeatClaims) -> Self {
        Principal::Seat {
            event_id: claims.event_id,
            table_id: claims.table_id,
            seat_id: claims.seat_id,
            seat_number: claims.seat_number,
        }
    }
}

/// Resolves a bearer token against both the user and seat JWT namespaces.
///
/// A request authenticated as "either" succeeds only when exactly one of
/// the two validates; a token that happens to decode under both secrets (or
/// under neither) is rejected, since the namespaces are meant to be
/// mutually exclusive.
#[derive(Clone)]
pub struct EitherPrincipal {
    user_jwt: UserJwt,
    seat_jwt: SeatJwt,
}

impl EitherPrincipal {
    pub fn new(user_jwt: UserJwt, seat_jwt: SeatJwt) -> Self {
        Self { user_jwt, seat_jwt }
    }

    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenValidationError> {
        let user = self.user_jwt.validate(token, now);
        let seat = self.seat_jwt.validate(token, now);

        match (user, seat) {
            (Ok(claims), Err(_)) => Ok(Principal::from(claims)),
            (Err(_), Ok(claims)) => Ok(Principal::from(claims)),
            (Ok(_), Ok(_)) => Err(TokenValidationError::InvalidToken(
                "token validated as both user and seat".into(),
            )),
            (Err(e), Err(_)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_user_token() {
        let resolver = EitherPrincipal::new(UserJwt::new(b"u".to_vec()), SeatJwt::new(b"s".to_vec()));
        let now = Utc::now();
        let claims = UserClaims::new(UserId::new(), Role::Admin, now);
        let token = resolver.user_jwt.issue(&claims).unwrap();
        let principal = resolver.resolve(&token, now).unwrap();
        assert!(principal.is_admin());
    }

    #[test]
    fn resolves_a_seat_token() {
        let resolver = EitherPrincipal::new(UserJwt::new(b"u".to_vec()), SeatJwt::new(b"s".to_vec()));
        let now = Utc::now();
        let claims = SeatClaims::new(EventId::new(), TableId::new(), SeatId::new(), 2, now);
        let token = resolver.seat_jwt.issue(&claims).unwrap();
        let principal = resolver.resolve(&token, now).unwrap();
        assert_eq!(principal.as_seat(), Some(claims.seat_id));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let resolver = EitherPrincipal::new(UserJwt::new(b"u".to_vec()), SeatJwt::new(b"s".to_vec()));
        assert!(resolver.resolve("not-a-jwt", Utc::now()).is_err());
    }
}
