//! Postgres-backed repositories for Category and Criterion.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use bbqjudge_core::{AggregateRoot, CategoryId, CriterionId, DomainError, DomainResult, EventId};
use bbqjudge_entries::CategoryLookup;
use bbqjudge_rubric::category::Category;
use bbqjudge_rubric::criterion::Criterion;
use bbqjudge_rubric::repo::{CategoryRepository, CriterionRepository};

use crate::error::map_sqlx_error;

fn row_to_category(row: sqlx::postgres::PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category::hydrate(
        CategoryId::from_uuid(row.try_get("id")?),
        EventId::from_uuid(row.try_get("event_id")?),
        row.try_get("name")?,
        row.try_get("sort_order")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgCategoryRepository {
    pool: Arc<PgPool>,
}

impl PgCategoryRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[tracing::instrument(skip(self, category), err)]
    async fn create(&self, category: Category) -> DomainResult<Category> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, event_id, name, sort_order, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(category.id.as_uuid().to_owned())
        .bind(category.event_id.as_uuid().to_owned())
        .bind(&category.name)
        .bind(category.sort_order)
        .bind(category.created_at)
        .bind(category.updated_at)
        .bind(category.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("categories.create", e))?;
        Ok(category)
    }

    #[tracing::instrument(skip(self, category), err)]
    async fn update(&self, category: Category) -> DomainResult<Category> {
        sqlx::query(
            "UPDATE categories SET name = $2, sort_order = $3, updated_at = $4, deleted_at = $5, version = $6 WHERE id = $1",
        )
        .bind(category.id.as_uuid().to_owned())
        .bind(&category.name)
        .bind(category.sort_order)
        .bind(category.updated_at)
        .bind(category.deleted_at)
        .bind(category.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("categories.update", e))?;
        Ok(category)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: CategoryId, include_deleted: bool) -> DomainResult<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("categories.find_by_id", e))?;
        row.map(row_to_category).transpose().map_err(|e| map_sqlx_error("categories.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT * FROM categories WHERE event_id = $1 AND name = $2 AND deleted_at IS NULL",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("categories.find_by_name", e))?;
        row.map(row_to_category).transpose().map_err(|e| map_sqlx_error("categories.find_by_name", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT * FROM categories WHERE event_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY sort_order ASC",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("categories.list_by_event", e))?;
        rows.into_iter()
            .map(row_to_category)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("categories.list_by_event", e))
    }
}

/// `bbqjudge-entries` only needs a category's owning event, not the full
/// rubric repository surface; bridge that narrow lookup onto the same
/// Postgres-backed repository used for rubric CRUD.
#[async_trait::async_trait]
impl CategoryLookup for PgCategoryRepository {
    async fn event_id_for_category(&self, category_id: CategoryId) -> DomainResult<EventId> {
        self.find_by_id(category_id, false)
            .await?
            .map(|category| category.event_id)
            .ok_or(DomainError::NotFound)
    }
}

fn row_to_criterion(row: sqlx::postgres::PgRow) -> Result<Criterion, sqlx::Error> {
    Ok(Criterion::hydrate(
        CriterionId::from_uuid(row.try_get("id")?),
        EventId::from_uuid(row.try_get("event_id")?),
        row.try_get("name")?,
        row.try_get::<Decimal, _>("weight")?,
        row.try_get("sort_order")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
        row.try_get("deleted_at")?,
        row.try_get::<i64, _>("version")? as u64,
    ))
}

pub struct PgCriterionRepository {
    pool: Arc<PgPool>,
}

impl PgCriterionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CriterionRepository for PgCriterionRepository {
    #[tracing::instrument(skip(self, criterion), err)]
    async fn create(&self, criterion: Criterion) -> DomainResult<Criterion> {
        sqlx::query(
            r#"
            INSERT INTO criteria (id, event_id, name, weight, sort_order, created_at, updated_at, deleted_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(criterion.id.as_uuid().to_owned())
        .bind(criterion.event_id.as_uuid().to_owned())
        .bind(&criterion.name)
        .bind(criterion.weight)
        .bind(criterion.sort_order)
        .bind(criterion.created_at)
        .bind(criterion.updated_at)
        .bind(criterion.deleted_at)
        .bind(1i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("criteria.create", e))?;
        Ok(criterion)
    }

    #[tracing::instrument(skip(self, criterion), err)]
    async fn update(&self, criterion: Criterion) -> DomainResult<Criterion> {
        sqlx::query(
            "UPDATE criteria SET name = $2, weight = $3, sort_order = $4, updated_at = $5, deleted_at = $6, version = $7 WHERE id = $1",
        )
        .bind(criterion.id.as_uuid().to_owned())
        .bind(&criterion.name)
        .bind(criterion.weight)
        .bind(criterion.sort_order)
        .bind(criterion.updated_at)
        .bind(criterion.deleted_at)
        .bind(criterion.version() as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("criteria.update", e))?;
        Ok(criterion)
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: CriterionId, include_deleted: bool) -> DomainResult<Option<Criterion>> {
        let row = sqlx::query("SELECT * FROM criteria WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id.as_uuid().to_owned())
            .bind(include_deleted)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("criteria.find_by_id", e))?;
        row.map(row_to_criterion).transpose().map_err(|e| map_sqlx_error("criteria.find_by_id", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Criterion>> {
        let row = sqlx::query(
            "SELECT * FROM criteria WHERE event_id = $1 AND name = $2 AND deleted_at IS NULL",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("criteria.find_by_name", e))?;
        row.map(row_to_criterion).transpose().map_err(|e| map_sqlx_error("criteria.find_by_name", e))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Criterion>> {
        let rows = sqlx::query(
            "SELECT * FROM criteria WHERE event_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY sort_order ASC",
        )
        .bind(event_id.as_uuid().to_owned())
        .bind(include_deleted)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error("criteria.list_by_event", e))?;
        rows.into_iter()
            .map(row_to_criterion)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("criteria.list_by_event", e))
    }
}
