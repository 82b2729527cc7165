//! Fire-and-forget delivery of audit rows with bounded inline retry.
//!
//! The sink never holds the caller's transaction open and never propagates
//! a write failure back to the mutation that triggered it; exhausted
//! retries are logged and dropped.

use std::sync::Arc;

use crate::model::AuditLog;
use crate::repo::AuditRepository;

const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Clone)]
pub struct AuditSink {
    repo: Arc<dyn AuditRepository>,
    max_retries: u32,
}

impl AuditSink {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self {
            repo,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(repo: Arc<dyn AuditRepository>, max_retries: u32) -> Self {
        Self { repo, max_retries }
    }

    /// Spawn the write; returns immediately regardless of outcome.
    pub fn record(&self, log: AuditLog) {
        let repo = self.repo.clone();
        let max_retries = self.max_retries;
        tokio::spawn(async move {
            let mut attempt: u32 = 0;
            loop {
                match repo.append(log.clone()).await {
                    Ok(()) => return,
                    Err(error) => {
                        attempt += 1;
                        tracing::error!(
                            %error,
                            attempt,
                            entity_type = %log.entity_type,
                            entity_id = %log.entity_id,
                            "audit write failed"
                        );
                        if attempt > max_retries {
                            return;
                        }
                    }
                }
            }
        });
    }
}
