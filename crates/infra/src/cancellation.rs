//! Cancellation wiring between Axum request lifecycles and storage calls.
//!
//! Individual repository methods are plain `async fn`s with no cancellation
//! parameter of their own — a single HTTP request handles its work
//! sequentially (one command, one set of queries), so cancellation is
//! applied around each storage call a handler makes, rather than threaded
//! through every repository trait method. [`run_cancelable`] is the one
//! place that distinction is implemented; `bbqjudge-api`'s handlers call
//! it (via a thin `cancelable` wrapper converting to the HTTP error type)
//! around every `services.*` await, with the token sourced from a request
//! extension set by a middleware that cancels it on client disconnect.

use std::future::Future;

use bbqjudge_core::{DomainError, DomainResult};
use tokio_util::sync::CancellationToken;

/// Race `fut` against `token`. If the token fires first, the in-flight
/// future is dropped at its next await point and [`DomainError::Canceled`]
/// is returned instead of `fut`'s own result.
pub async fn run_cancelable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(DomainError::Canceled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_normally_without_cancellation() {
        let token = CancellationToken::new();
        let result = run_cancelable(&token, async { Ok::<_, DomainError>(42) }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn returns_canceled_when_token_already_fired() {
        let token = CancellationToken::new();
        token.cancel();
        let result = run_cancelable(&token, async {
            std::future::pending::<DomainResult<i32>>().await
        })
        .await;
        assert_eq!(result, Err(DomainError::Canceled));
    }
}
