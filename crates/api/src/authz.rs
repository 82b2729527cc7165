//! Thin route-layer wrapper over [`bbqjudge_auth::require_permission`].
//!
//! Route handlers hold a [`bbqjudge_auth::Principal`] extracted from request
//! extensions by [`crate::middleware::auth_middleware`]; this module turns a
//! failed permission check directly into the HTTP error response shape.

use bbqjudge_auth::{require_permission, Principal};

use crate::app::errors::ApiError;

/// Require that `principal` is a `User` holding `permission`. Seat principals
/// never hold permissions and are rejected with `FORBIDDEN`.
pub fn require(principal: &Principal, permission: &'static str) -> Result<(), ApiError> {
    require_permission(principal, permission).map_err(|_| ApiError::forbidden())
}

/// Require that `principal` is an admin user.
pub fn require_admin(principal: &Principal) -> Result<(), ApiError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// Require that `principal` is an operator user, of either role — i.e. not
/// a seat. Used for endpoints documented as "admin+operator".
pub fn require_user(principal: &Principal) -> Result<(), ApiError> {
    match principal {
        Principal::User { .. } => Ok(()),
        Principal::Seat { .. } => Err(ApiError::forbidden()),
    }
}

