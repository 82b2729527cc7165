//! Bearer-token authentication and per-request cancellation.
//!
//! [`auth_middleware`] resolves a request's `Authorization` header into a
//! [`bbqjudge_auth::Principal`] and stores it as a request extension for
//! handlers and [`crate::authz`] to consume. [`cancellation_middleware`]
//! mints a fresh [`CancellationToken`] per request and stores it the same
//! way, for handlers to pass to [`crate::app::cancel::cancelable`] around
//! each storage call.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use bbqjudge_auth::EitherPrincipal;

#[derive(Clone)]
pub struct AuthState {
    pub resolver: Arc<EitherPrincipal>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let principal = state
        .resolver
        .resolve(token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Insert a per-request [`CancellationToken`] and cancel it if the
/// surrounding future is dropped before the response is produced — which is
/// exactly what happens when the client disconnects mid-request: axum drops
/// the in-flight handler future without polling it to completion, running
/// any `Drop` impls captured inside it. Handlers race their storage calls
/// against the token via [`crate::app::cancel::cancelable`], so a dropped
/// connection stops in-flight work at its next suspension point instead of
/// running to completion for a client that is no longer listening.
///
/// The whole-request *timeout* remains the transport layer's to own (the
/// token here only reacts to disconnect); this middleware does not itself
/// start a timer.
pub async fn cancellation_middleware(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let token = CancellationToken::new();
    req.extensions_mut().insert(token.clone());

    struct CancelOnDrop(CancellationToken);
    impl Drop for CancelOnDrop {
        fn drop(&mut self) {
            self.0.cancel();
        }
    }
    let _guard = CancelOnDrop(token);

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
