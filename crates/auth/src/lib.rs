//! Auth core: user identities, roles/permissions, JWT issuance and
//! validation for the two principal kinds (operator users and per-seat
//! judge tokens), and the `Either` resolver that lets a route accept
//! whichever of the two validates.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{require_permission, AuthzError};
pub use claims::{SeatClaims, TokenValidationError, UserClaims, SEAT_TOKEN_TTL, USER_TOKEN_TTL};
pub use jwt::{SeatJwt, UserJwt};
pub use password::{hash_password, verify_password};
pub use permissions::authorize;
pub use principal::{EitherPrincipal, Principal};
pub use roles::Role;
pub use user::{User, UserRepository};
