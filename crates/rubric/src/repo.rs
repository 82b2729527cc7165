//! Repository abstractions for Category and Criterion.

use async_trait::async_trait;

use bbqjudge_core::{CategoryId, CriterionId, DomainResult, EventId};

use crate::category::Category;
use crate::criterion::Criterion;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: Category) -> DomainResult<Category>;
    async fn update(&self, category: Category) -> DomainResult<Category>;
    async fn find_by_id(&self, id: CategoryId, include_deleted: bool) -> DomainResult<Option<Category>>;
    async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Category>>;
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Category>>;
}

#[async_trait]
pub trait CriterionRepository: Send + Sync {
    async fn create(&self, criterion: Criterion) -> DomainResult<Criterion>;
    async fn update(&self, criterion: Criterion) -> DomainResult<Criterion>;
    async fn find_by_id(&self, id: CriterionId, include_deleted: bool) -> DomainResult<Option<Criterion>>;
    async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Criterion>>;
    async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Criterion>>;
}
