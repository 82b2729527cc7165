//! `/events/:id/results`, `/events/:eventId/categories/:categoryId/results`,
//! `/submissions/:id/result`: read-only aggregation and ranking views, open
//! to any authenticated principal.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Router;
use tokio_util::sync::CancellationToken;

use bbqjudge_auth::Principal;
use bbqjudge_core::{CategoryId, EventId, SubmissionId};

use crate::app::cancel::cancelable;
use crate::app::dto::ok;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/events/:event_id/results", axum::routing::get(event_result))
        .route(
            "/events/:event_id/categories/:category_id/results",
            axum::routing::get(category_result),
        )
        .route("/submissions/:id/result", axum::routing::get(submission_result))
}

async fn event_result(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    let result = cancelable(&token, services.results.event_result(event_id)).await?;
    Ok(ok(result))
}

async fn category_result(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path((_event_id, category_id)): Path<(EventId, CategoryId)>,
) -> Result<axum::response::Response, ApiError> {
    let result = cancelable(&token, services.results.category_result(category_id)).await?;
    Ok(ok(result))
}

async fn submission_result(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<SubmissionId>,
) -> Result<axum::response::Response, ApiError> {
    let result = cancelable(&token, services.results.submission_result(id)).await?;
    Ok(ok(result))
}
