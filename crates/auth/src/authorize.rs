//! Route-level authorization: requires a resolved [`Principal`] to be a
//! user principal carrying a given permission. Seat principals never carry
//! operator permissions; they are authorized separately (own-seat checks
//! live in the judging/entries services, not here).

use thiserror::Error;

use crate::permissions::{self};
use crate::principal::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: seat principals do not carry operator permissions")]
    NotAUser,

    #[error(transparent)]
    Permissions(#[from] permissions::AuthzError),
}

/// Require that `principal` is a user carrying `permission`.
pub fn require_permission(principal: &Principal, permission: &'static str) -> Result<(), AuthzError> {
    match principal {
        Principal::User { role, .. } => {
            permissions::authorize(*role, permission)?;
            Ok(())
        }
        Principal::Seat { .. } => Err(AuthzError::NotAUser),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::EVENT_CREATE;
    use crate::roles::Role;
    use bbqjudge_core::{EventId, SeatId, TableId, UserId};

    #[test]
    fn admin_user_passes() {
        let principal = Principal::User { user_id: UserId::new(), role: Role::Admin };
        assert!(require_permission(&principal, EVENT_CREATE).is_ok());
    }

    #[test]
    fn operator_user_fails_admin_only_permission() {
        let principal = Principal::User { user_id: UserId::new(), role: Role::Operator };
        assert!(require_permission(&principal, EVENT_CREATE).is_err());
    }

    #[test]
    fn seat_principal_never_passes() {
        let principal = Principal::Seat {
            event_id: EventId::new(),
            table_id: TableId::new(),
            seat_id: SeatId::new(),
            seat_number: 1,
        };
        assert_eq!(require_permission(&principal, EVENT_CREATE), Err(AuthzError::NotAUser));
    }
}
