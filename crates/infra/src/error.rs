//! Maps `sqlx::Error` onto `DomainError`, the one seam the domain layer
//! understands. Storage internals never leak past this boundary.

use bbqjudge_core::DomainError;

/// Postgres error codes this mapping distinguishes. See the Postgres manual,
/// Appendix A, for the full catalog.
mod pg_code {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
}

/// Map a storage-layer failure to a `DomainError`, tagging the log line with
/// `context` (typically `"<entity>.<operation>"`) for triage.
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(pg_code::UNIQUE_VIOLATION) => {
                DomainError::conflict(format!("{context}: duplicate key"))
            }
            Some(pg_code::FOREIGN_KEY_VIOLATION) => {
                DomainError::conflict(format!("{context}: referenced row still has live children"))
            }
            Some(pg_code::CHECK_VIOLATION) => {
                DomainError::validation(format!("{context}: constraint violation"))
            }
            _ => {
                tracing::error!(context, error = %db_err, "unmapped database error");
                DomainError::internal(format!("{context}: database error"))
            }
        },
        sqlx::Error::RowNotFound => DomainError::not_found(),
        other => {
            tracing::error!(context, error = %other, "storage error");
            DomainError::internal(format!("{context}: storage error"))
        }
    }
}
