//! Operator permission vocabulary and the admin/operator policy table.
//!
//! Permissions are opaque strings, as in a capability list, so new ones can
//! be introduced without touching the [`Role`] enum.

use std::collections::HashSet;

use thiserror::Error;

use crate::roles::Role;

pub const EVENT_CREATE: &str = "event.create";
pub const EVENT_STATUS_UPDATE: &str = "event.status_update";
pub const USER_CREATE: &str = "user.create";
pub const WRITE_DOMAIN: &str = "write.domain";
pub const READ_DELETED: &str = "read.deleted";
pub const SCORE_HARD_DELETE: &str = "score.hard_delete";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("forbidden: missing permission '{0}'")]
pub struct AuthzError(pub &'static str);

fn permissions_for_role(role: Role) -> HashSet<&'static str> {
    match role {
        Role::Admin => HashSet::from([
            EVENT_CREATE,
            EVENT_STATUS_UPDATE,
            USER_CREATE,
            WRITE_DOMAIN,
            READ_DELETED,
            SCORE_HARD_DELETE,
        ]),
        Role::Operator => HashSet::from([EVENT_STATUS_UPDATE, WRITE_DOMAIN]),
    }
}

/// Check whether `role` carries `permission`.
pub fn authorize(role: Role, permission: &'static str) -> Result<(), AuthzError> {
    if permissions_for_role(role).contains(permission) {
        Ok(())
    } else {
        Err(AuthzError(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_permission() {
        for p in [EVENT_CREATE, EVENT_STATUS_UPDATE, USER_CREATE, WRITE_DOMAIN, READ_DELETED, SCORE_HARD_DELETE] {
            assert!(authorize(Role::Admin, p).is_ok());
        }
    }

    #[test]
    fn operator_cannot_create_events_or_users() {
        assert!(authorize(Role::Operator, EVENT_CREATE).is_err());
        assert!(authorize(Role::Operator, USER_CREATE).is_err());
    }

    #[test]
    fn operator_can_update_event_status_and_write_domain() {
        assert!(authorize(Role::Operator, EVENT_STATUS_UPDATE).is_ok());
        assert!(authorize(Role::Operator, WRITE_DOMAIN).is_ok());
    }

    #[test]
    fn operator_cannot_read_deleted_or_hard_delete_scores() {
        assert!(authorize(Role::Operator, READ_DELETED).is_err());
        assert!(authorize(Role::Operator, SCORE_HARD_DELETE).is_err());
    }
}
