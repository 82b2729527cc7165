//! Wires a request's [`CancellationToken`] (see [`crate::middleware`]) into
//! every storage call a handler makes, per §5: "every storage call receives
//! a request-scoped cancellation signal".

use std::future::Future;

use tokio_util::sync::CancellationToken;

use bbqjudge_core::DomainResult;

use super::errors::ApiError;

/// Race `fut` against `token`; a fired token yields `ApiError`'s
/// canceled response (see [`bbqjudge_core::DomainError::Canceled`]) instead
/// of `fut`'s own result. Handlers call this around each `services.*` await
/// rather than awaiting the service call directly.
pub async fn cancelable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = DomainResult<T>>,
) -> Result<T, ApiError> {
    Ok(bbqjudge_infra::cancellation::run_cancelable(token, fut).await?)
}
