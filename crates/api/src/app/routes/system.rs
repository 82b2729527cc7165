//! Unauthenticated liveness/readiness probes.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;

use bbqjudge_auth::UserRepository;

use crate::app::services::AppServices;

/// `GET /health` — process is up.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `GET /health/ready` — process is up and the database is reachable.
pub async fn health_ready(Extension(services): Extension<Arc<AppServices>>) -> impl axum::response::IntoResponse {
    match services.users.find_by_username("__readiness_probe__").await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ready": true }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ready": false })),
        ),
    }
}
