use axum::Router;

pub mod audit;
pub mod auth;
pub mod entries;
pub mod events;
pub mod judging;
pub mod results;
pub mod rubric;
pub mod system;
pub mod teams;
pub mod venue;

/// Router for every endpoint behind the auth middleware layer.
pub fn protected_router() -> Router {
    Router::new()
        .merge(events::router())
        .merge(venue::router())
        .merge(rubric::router())
        .merge(teams::router())
        .merge(entries::router())
        .merge(judging::router())
        .merge(results::router())
        .merge(audit::router())
        .merge(auth::protected_router())
}

/// `/auth/login` and `/auth/seat-token`, mounted outside the auth layer.
pub fn public_router() -> Router {
    auth::public_router()
}
