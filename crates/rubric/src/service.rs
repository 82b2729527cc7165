//! `RubricService`: CRUD + invariants over Category and Criterion,
//! including the request-scope, all-or-nothing bulk-create path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bbqjudge_core::{Aggregate, CategoryId, CriterionId, DomainError, DomainResult, EventId};
use bbqjudge_venue::EventRepository;

use crate::category::{Category, CategoryCommand, CreateCategory, SoftDeleteCategory, UpdateCategory};
use crate::criterion::{CreateCriterion, Criterion, CriterionCommand, SoftDeleteCriterion, UpdateCriterion};
use crate::repo::{CategoryRepository, CriterionRepository};

pub struct NewCategory {
    pub name: String,
    pub sort_order: i32,
}

pub struct NewCriterion {
    pub name: String,
    pub weight: Option<Decimal>,
    pub sort_order: i32,
}

pub struct RubricService {
    events: Arc<dyn EventRepository>,
    categories: Arc<dyn CategoryRepository>,
    criteria: Arc<dyn CriterionRepository>,
}

impl RubricService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        categories: Arc<dyn CategoryRepository>,
        criteria: Arc<dyn CriterionRepository>,
    ) -> Self {
        Self { events, categories, criteria }
    }

    async fn require_event(&self, event_id: EventId) -> DomainResult<()> {
        self.events
            .find_by_id(event_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        Ok(())
    }

    pub async fn create_category(
        &self,
        event_id: EventId,
        name: String,
        sort_order: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Category> {
        self.require_event(event_id).await?;
        if self.categories.find_by_name(event_id, &name).await?.is_some() {
            return Err(DomainError::conflict("category name already in use for this event"));
        }
        let mut category = Category::empty(CategoryId::new());
        let events = category.handle(&CategoryCommand::Create(CreateCategory {
            id: category.id,
            event_id,
            name,
            sort_order,
            now,
        }))?;
        for e in &events {
            category.apply(e);
        }
        self.categories.create(category).await
    }

    /// All-or-nothing: validates the batch for internal duplicate names
    /// before checking the store, so a caller sees one `Conflict` for the
    /// whole request rather than a partial write.
    pub async fn bulk_create_categories(
        &self,
        event_id: EventId,
        items: Vec<NewCategory>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Category>> {
        self.require_event(event_id).await?;

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.name.clone()) {
                return Err(DomainError::conflict(format!(
                    "duplicate category name '{}' within request",
                    item.name
                )));
            }
        }
        for item in &items {
            if self.categories.find_by_name(event_id, &item.name).await?.is_some() {
                return Err(DomainError::conflict(format!(
                    "category name '{}' already in use for this event",
                    item.name
                )));
            }
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let mut category = Category::empty(CategoryId::new());
            let events = category.handle(&CategoryCommand::Create(CreateCategory {
                id: category.id,
                event_id,
                name: item.name,
                sort_order: item.sort_order,
                now,
            }))?;
            for e in &events {
                category.apply(e);
            }
            created.push(self.categories.create(category).await?);
        }
        Ok(created)
    }

    pub async fn get_category(&self, id: CategoryId, include_deleted: bool) -> DomainResult<Category> {
        self.categories.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_categories_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Category>> {
        self.require_event(event_id).await?;
        self.categories.list_by_event(event_id, include_deleted).await
    }

    pub async fn update_category(&self, id: CategoryId, update: UpdateCategory) -> DomainResult<Category> {
        let mut category = self
            .categories
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        if let Some(new_name) = &update.name {
            if let Some(existing) = self.categories.find_by_name(category.event_id, new_name).await? {
                if existing.id != id {
                    return Err(DomainError::conflict("category name already in use for this event"));
                }
            }
        }
        let events = category.handle(&CategoryCommand::Update(update))?;
        for e in &events {
            category.apply(e);
        }
        self.categories.update(category).await
    }

    pub async fn soft_delete_category(&self, id: CategoryId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut category = self
            .categories
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let events = category.handle(&CategoryCommand::SoftDelete(SoftDeleteCategory { now }))?;
        for e in &events {
            category.apply(e);
        }
        self.categories.update(category).await?;
        Ok(())
    }

    pub async fn create_criterion(
        &self,
        event_id: EventId,
        name: String,
        weight: Option<Decimal>,
        sort_order: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Criterion> {
        self.require_event(event_id).await?;
        if self.criteria.find_by_name(event_id, &name).await?.is_some() {
            return Err(DomainError::conflict("criterion name already in use for this event"));
        }
        let mut criterion = Criterion::empty(CriterionId::new());
        let events = criterion.handle(&CriterionCommand::Create(CreateCriterion {
            id: criterion.id,
            event_id,
            name,
            weight,
            sort_order,
            now,
        }))?;
        for e in &events {
            criterion.apply(e);
        }
        self.criteria.create(criterion).await
    }

    pub async fn bulk_create_criteria(
        &self,
        event_id: EventId,
        items: Vec<NewCriterion>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Criterion>> {
        self.require_event(event_id).await?;

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.name.clone()) {
                return Err(DomainError::conflict(format!(
                    "duplicate criterion name '{}' within request",
                    item.name
                )));
            }
        }
        for item in &items {
            if self.criteria.find_by_name(event_id, &item.name).await?.is_some() {
                return Err(DomainError::conflict(format!(
                    "criterion name '{}' already in use for this event",
                    item.name
                )));
            }
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let mut criterion = Criterion::empty(CriterionId::new());
            let events = criterion.handle(&CriterionCommand::Create(CreateCriterion {
                id: criterion.id,
                event_id,
                name: item.name,
                weight: item.weight,
                sort_order: item.sort_order,
                now,
            }))?;
            for e in &events {
                criterion.apply(e);
            }
            created.push(self.criteria.create(criterion).await?);
        }
        Ok(created)
    }

    pub async fn get_criterion(&self, id: CriterionId, include_deleted: bool) -> DomainResult<Criterion> {
        self.criteria.find_by_id(id, include_deleted).await?.ok_or_else(DomainError::not_found)
    }

    pub async fn list_criteria_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Criterion>> {
        self.require_event(event_id).await?;
        self.criteria.list_by_event(event_id, include_deleted).await
    }

    pub async fn update_criterion(&self, id: CriterionId, update: UpdateCriterion) -> DomainResult<Criterion> {
        let mut criterion = self
            .criteria
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        if let Some(new_name) = &update.name {
            if let Some(existing) = self.criteria.find_by_name(criterion.event_id, new_name).await? {
                if existing.id != id {
                    return Err(DomainError::conflict("criterion name already in use for this event"));
                }
            }
        }
        let events = criterion.handle(&CriterionCommand::Update(update))?;
        for e in &events {
            criterion.apply(e);
        }
        self.criteria.update(criterion).await
    }

    pub async fn soft_delete_criterion(&self, id: CriterionId, now: DateTime<Utc>) -> DomainResult<()> {
        let mut criterion = self
            .criteria
            .find_by_id(id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let events = criterion.handle(&CriterionCommand::SoftDelete(SoftDeleteCriterion { now }))?;
        for e in &events {
            criterion.apply(e);
        }
        self.criteria.update(criterion).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bbqjudge_core::{DomainResult, EventId, PageInfo, Pagination};
    use bbqjudge_venue::Event;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct InMemoryEvents(Mutex<HashMap<EventId, Event>>);

    #[async_trait]
    impl EventRepository for InMemoryEvents {
        async fn create(&self, event: Event) -> DomainResult<Event> {
            self.0.lock().unwrap().insert(event.id, event.clone());
            Ok(event)
        }
        async fn update(&self, event: Event) -> DomainResult<Event> {
            self.0.lock().unwrap().insert(event.id, event.clone());
            Ok(event)
        }
        async fn find_by_id(&self, id: EventId, _include_deleted: bool) -> DomainResult<Option<Event>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn list(&self, _include_deleted: bool, pagination: Pagination) -> DomainResult<(Vec<Event>, PageInfo)> {
            let items: Vec<Event> = self.0.lock().unwrap().values().cloned().collect();
            Ok((items.clone(), PageInfo::new(pagination, items.len() as u64)))
        }
    }

    #[derive(Default)]
    struct InMemoryCategories(Mutex<HashMap<CategoryId, Category>>);

    #[async_trait]
    impl CategoryRepository for InMemoryCategories {
        async fn create(&self, category: Category) -> DomainResult<Category> {
            self.0.lock().unwrap().insert(category.id, category.clone());
            Ok(category)
        }
        async fn update(&self, category: Category) -> DomainResult<Category> {
            self.0.lock().unwrap().insert(category.id, category.clone());
            Ok(category)
        }
        async fn find_by_id(&self, id: CategoryId, include_deleted: bool) -> DomainResult<Option<Category>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|c| include_deleted || !c.is_deleted()))
        }
        async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Category>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|c| c.event_id == event_id && c.name == name && !c.is_deleted())
                .cloned())
        }
        async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Category>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.event_id == event_id && (include_deleted || !c.is_deleted()))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct InMemoryCriteria(Mutex<HashMap<CriterionId, Criterion>>);

    #[async_trait]
    impl CriterionRepository for InMemoryCriteria {
        async fn create(&self, criterion: Criterion) -> DomainResult<Criterion> {
            self.0.lock().unwrap().insert(criterion.id, criterion.clone());
            Ok(criterion)
        }
        async fn update(&self, criterion: Criterion) -> DomainResult<Criterion> {
            self.0.lock().unwrap().insert(criterion.id, criterion.clone());
            Ok(criterion)
        }
        async fn find_by_id(&self, id: CriterionId, include_deleted: bool) -> DomainResult<Option<Criterion>> {
            Ok(self.0.lock().unwrap().get(&id).cloned().filter(|c| include_deleted || !c.is_deleted()))
        }
        async fn find_by_name(&self, event_id: EventId, name: &str) -> DomainResult<Option<Criterion>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|c| c.event_id == event_id && c.name == name && !c.is_deleted())
                .cloned())
        }
        async fn list_by_event(&self, event_id: EventId, include_deleted: bool) -> DomainResult<Vec<Criterion>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.event_id == event_id && (include_deleted || !c.is_deleted()))
                .cloned()
                .collect())
        }
    }

    async fn seeded_event(events: &InMemoryEvents) -> EventId {
        let event = Event::empty(EventId::new());
        // Bypass the Event aggregate here; rubric tests only need a row
        // that exists, not a fully constructed Event.
        let id = event.id;
        events.0.lock().unwrap().insert(id, event);
        id
    }

    fn services(events: Arc<InMemoryEvents>) -> RubricService {
        RubricService::new(events, Arc::new(InMemoryCategories::default()), Arc::new(InMemoryCriteria::default()))
    }

    #[tokio::test]
    async fn create_category_requires_existing_event() {
        let events = Arc::new(InMemoryEvents::default());
        let svc = services(events);
        let err = svc
            .create_category(EventId::new(), "Brisket".into(), 1, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let svc = services(events);
        svc.create_category(event_id, "Brisket".into(), 1, Utc::now()).await.unwrap();
        let err = svc
            .create_category(event_id, "Brisket".into(), 2, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn bulk_create_is_all_or_nothing_on_internal_duplicate() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let svc = services(events);
        let err = svc
            .bulk_create_categories(
                event_id,
                vec![
                    NewCategory { name: "Brisket".into(), sort_order: 1 },
                    NewCategory { name: "Brisket".into(), sort_order: 2 },
                ],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn criterion_defaults_weight_and_rejects_duplicate_name() {
        let events = Arc::new(InMemoryEvents::default());
        let event_id = seeded_event(&events).await;
        let svc = services(events);
        let created = svc
            .create_criterion(event_id, "Taste".into(), None, 0, Utc::now())
            .await
            .unwrap();
        assert_eq!(created.weight, dec!(1));

        let err = svc
            .create_criterion(event_id, "Taste".into(), None, 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[allow(dead_code)]
    fn _unused_naive_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }
}
