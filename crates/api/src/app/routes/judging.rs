//! `/categories/:id/assignment-plan` and the seat's live "what's next"
//! lookup. Both are pure computations — nothing here is persisted.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::Router;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{CategoryId, SeatId, TableId};
use bbqjudge_entries::Phase;

use crate::app::cancel::cancelable;
use crate::app::dto::ok;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route(
            "/categories/:category_id/assignment-plan",
            axum::routing::post(generate_assignment_plan),
        )
        .route(
            "/categories/:category_id/tables/:table_id/seats/:seat_id/next",
            axum::routing::get(next_for_seat),
        )
}

#[derive(Debug, Deserialize, Default)]
struct AssignmentPlanQuery {
    seed: Option<i64>,
}

async fn generate_assignment_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<AssignmentPlanQuery>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let plan = cancelable(&token, services.judging.generate_assignment_plan(category_id, query.seed)).await?;
    Ok(ok(plan))
}

#[derive(Debug, Deserialize)]
struct NextForSeatQuery {
    phase: Phase,
}

async fn next_for_seat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path((category_id, table_id, seat_id)): Path<(CategoryId, TableId, SeatId)>,
    Query(query): Query<NextForSeatQuery>,
) -> Result<axum::response::Response, ApiError> {
    match &principal {
        Principal::Seat { seat_id: authed_seat, .. } if *authed_seat == seat_id => {}
        _ => return Err(ApiError::forbidden()),
    }
    let next = cancelable(
        &token,
        services.judging.next_submission_for_seat(category_id, table_id, seat_id, query.phase),
    )
    .await?;
    Ok(ok(serde_json::json!({ "submissionId": next })))
}
