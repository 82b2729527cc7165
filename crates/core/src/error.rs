//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (uniqueness, bulk duplicate, cross-event mismatch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A status transition was requested that is not adjacent in the status machine.
    #[error("invalid status transition: {0}")]
    InvalidStatusTransition(String),

    /// Authentication failure at the domain boundary (bad credentials/token).
    #[error("unauthorized")]
    Unauthorized,

    /// Authorization failure at the domain boundary (wrong role, cross-seat edit).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The calling request was canceled before the operation completed.
    #[error("canceled")]
    Canceled,

    /// An unexpected failure below the domain boundary (storage, codec,
    /// etc.). Never surfaced to callers with detail; the transport layer
    /// maps this to a generic 500 and logs the original cause separately.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_status_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStatusTransition(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}


