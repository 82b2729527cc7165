//! The caller identity carried through the request pipeline.
//!
//! There is no tenant to scope to here: a single deployment serves one or
//! more `Event`s, and the caller is either an operator/admin `User` or a
//! seat's principal. `auth_middleware` resolves the bearer token into a
//! [`bbqjudge_auth::Principal`] and inserts it directly as a request
//! extension; no wrapper type is needed.

pub use bbqjudge_auth::Principal;
