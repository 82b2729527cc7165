//! HTTP API application wiring (Axum router + service wiring).
//!
//! If you're new to Rust, this folder is structured like:
//! - `services.rs`: infrastructure wiring (event store/bus, projections, dispatcher)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use bbqjudge_infra::config::AppConfig;

use crate::middleware;

pub mod audit;
pub mod cancel;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    let auth_state = middleware::AuthState { resolver: services.jwt_resolver.clone() };

    // Protected routes: require a resolved principal.
    let protected = routes::protected_router()
        .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware));

    // Public routes: health probes and the endpoints that mint a principal.
    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/health/ready", get(routes::system::health_ready))
        .merge(routes::public_router());

    Ok(Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::cancellation_middleware))
        .layer(Extension(services))
        .layer(ServiceBuilder::new()))
}


