//! Append-only audit trail: the row model, the envelope pattern used to
//! build rows from typed mutation payloads, sanitization of sensitive
//! fields, and the best-effort write sink.

pub mod envelope;
pub mod model;
pub mod repo;
pub mod sanitize;
pub mod sink;

pub use envelope::{ActorContext, AuditEncodeError, AuditEnvelope, RequestMetadata};
pub use model::{ActorType, AuditAction, AuditLog};
pub use repo::{AuditLogFilter, AuditRepository};
pub use sanitize::sanitize_value;
pub use sink::AuditSink;
