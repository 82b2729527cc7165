//! `/events/:eventId/categories` and `/events/:eventId/criteria`: the
//! scoring dimensions Submissions and Scores are judged against, with
//! all-or-nothing bulk-create variants.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use bbqjudge_audit::AuditAction;
use bbqjudge_auth::{permissions, Principal};
use bbqjudge_core::{CategoryId, CriterionId, EventId};
use bbqjudge_rubric::category::UpdateCategory;
use bbqjudge_rubric::criterion::UpdateCriterion;
use bbqjudge_rubric::{NewCategory, NewCriterion};

use crate::app::audit;
use crate::app::cancel::cancelable;
use crate::app::dto::{no_content, ok, with_status};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/events/:event_id/categories", get(list_categories).post(create_category))
        .route(
            "/events/:event_id/categories/bulk",
            axum::routing::post(bulk_create_categories),
        )
        .route("/categories/:id", get(get_category).patch(update_category).delete(delete_category))
        .route("/events/:event_id/criteria", get(list_criteria).post(create_criterion))
        .route("/events/:event_id/criteria/bulk", axum::routing::post(bulk_create_criteria))
        .route("/criteria/:id", get(get_criterion).patch(update_criterion).delete(delete_criterion))
}

#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
    sort_order: i32,
}

#[derive(Debug, Deserialize)]
struct BulkCategoryItem {
    name: String,
    sort_order: i32,
}

#[derive(Debug, Deserialize)]
struct BulkCreateRequest<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize, Default)]
struct UpdateCategoryRequest {
    name: Option<String>,
    sort_order: Option<i32>,
}

async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let category =
        cancelable(&token, services.rubric.create_category(event_id, body.name, body.sort_order, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Category", category.id, Some(&category), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, category))
}

async fn bulk_create_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<BulkCreateRequest<BulkCategoryItem>>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let items = body
        .items
        .into_iter()
        .map(|i| NewCategory { name: i.name, sort_order: i.sort_order })
        .collect();
    let created = cancelable(&token, services.rubric.bulk_create_categories(event_id, items, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Category", event_id, Some(&created), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, created))
}

async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let categories =
        cancelable(&token, services.rubric.list_categories_by_event(event_id, principal.is_admin())).await?;
    Ok(ok(categories))
}

async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CategoryId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let category = cancelable(&token, services.rubric.get_category(id, principal.is_admin())).await?;
    Ok(ok(category))
}

async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CategoryId>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let category = cancelable(
        &token,
        services.rubric.update_category(id, UpdateCategory { name: body.name, sort_order: body.sort_order, now: Utc::now() }),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Updated, "Category", category.id, Some(&category), Some(category.event_id));
    Ok(ok(category))
}

async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CategoryId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.rubric.soft_delete_category(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Category", id, None, None);
    Ok(no_content())
}

#[derive(Debug, Deserialize)]
struct CreateCriterionRequest {
    name: String,
    weight: Option<Decimal>,
    sort_order: i32,
}

#[derive(Debug, Deserialize)]
struct BulkCriterionItem {
    name: String,
    weight: Option<Decimal>,
    sort_order: i32,
}

#[derive(Debug, Deserialize, Default)]
struct UpdateCriterionRequest {
    name: Option<String>,
    weight: Option<Decimal>,
    sort_order: Option<i32>,
}

async fn create_criterion(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<CreateCriterionRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let criterion = cancelable(
        &token,
        services.rubric.create_criterion(event_id, body.name, body.weight, body.sort_order, Utc::now()),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Created, "Criterion", criterion.id, Some(&criterion), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, criterion))
}

async fn bulk_create_criteria(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
    Json(body): Json<BulkCreateRequest<BulkCriterionItem>>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let items = body
        .items
        .into_iter()
        .map(|i| NewCriterion { name: i.name, weight: i.weight, sort_order: i.sort_order })
        .collect();
    let created = cancelable(&token, services.rubric.bulk_create_criteria(event_id, items, Utc::now())).await?;
    audit::record(&services, &principal, AuditAction::Created, "Criterion", event_id, Some(&created), Some(event_id));
    Ok(with_status(axum::http::StatusCode::CREATED, created))
}

async fn list_criteria(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(event_id): Path<EventId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let criteria = cancelable(&token, services.rubric.list_criteria_by_event(event_id, principal.is_admin())).await?;
    Ok(ok(criteria))
}

async fn get_criterion(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CriterionId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_user(&principal)?;
    let criterion = cancelable(&token, services.rubric.get_criterion(id, principal.is_admin())).await?;
    Ok(ok(criterion))
}

async fn update_criterion(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CriterionId>,
    Json(body): Json<UpdateCriterionRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    let criterion = cancelable(
        &token,
        services.rubric.update_criterion(
            id,
            UpdateCriterion { name: body.name, weight: body.weight, sort_order: body.sort_order, now: Utc::now() },
        ),
    )
    .await?;
    audit::record(&services, &principal, AuditAction::Updated, "Criterion", criterion.id, Some(&criterion), Some(criterion.event_id));
    Ok(ok(criterion))
}

async fn delete_criterion(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Extension(token): Extension<CancellationToken>,
    Path(id): Path<CriterionId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require(&principal, permissions::WRITE_DOMAIN)?;
    cancelable(&token, services.rubric.soft_delete_criterion(id, Utc::now())).await?;
    audit::record::<()>(&services, &principal, AuditAction::SoftDeleted, "Criterion", id, None, None);
    Ok(no_content())
}
