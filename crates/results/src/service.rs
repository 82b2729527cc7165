//! `ResultsService`: orchestrates the aggregator and ranker over persisted
//! scores. Read-only; every call re-fetches from the repositories and
//! recomputes rather than reading from a cache.

use std::collections::HashMap;
use std::sync::Arc;

use bbqjudge_core::{CategoryId, DomainError, DomainResult, EventId, SubmissionId};
use bbqjudge_entries::{ScoreRepository, SubmissionRepository};
use bbqjudge_rubric::{CategoryRepository, CriterionRepository};
use bbqjudge_scoring::{accumulate_rank_sums, rank_by_score, rank_overall, weighted_final_score, CriterionContribution};
use bbqjudge_venue::{EventRepository, SeatRepository};

use crate::types::{
    CategoryResult, CompletionStatus, CriterionResult, EventResult, RankedSubmission, RankedTeamStanding,
    SubmissionResult,
};

pub struct ResultsService {
    events: Arc<dyn EventRepository>,
    seats: Arc<dyn SeatRepository>,
    categories: Arc<dyn CategoryRepository>,
    criteria: Arc<dyn CriterionRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl ResultsService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        seats: Arc<dyn SeatRepository>,
        categories: Arc<dyn CategoryRepository>,
        criteria: Arc<dyn CriterionRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self { events, seats, categories, criteria, submissions, scores }
    }

    pub async fn submission_result(&self, submission_id: SubmissionId) -> DomainResult<SubmissionResult> {
        let submission = self
            .submissions
            .find_by_id(submission_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        let category = self
            .categories
            .find_by_id(submission.category_id, false)
            .await?
            .ok_or_else(DomainError::not_found)?;
        self.compute_submission_result(&submission, category.event_id).await
    }

    async fn compute_submission_result(
        &self,
        submission: &bbqjudge_entries::Submission,
        event_id: EventId,
    ) -> DomainResult<SubmissionResult> {
        let event = self.events.find_by_id(event_id, false).await?.ok_or_else(DomainError::not_found)?;
        let mut criteria = self.criteria.list_by_event(event_id, false).await?;
        criteria.sort_by_key(|c| c.sort_order);

        let all_scores = self.scores.list_by_submission(submission.id).await?;
        let active_judges = self.seats.count_active_for_event(event_id).await?;

        let mut criterion_results = Vec::with_capacity(criteria.len());
        let mut contributions = Vec::with_capacity(criteria.len());
        let mut any_scored = false;
        let mut all_complete = !criteria.is_empty();

        for criterion in &criteria {
            let values: Vec<_> = all_scores
                .iter()
                .filter(|s| s.criterion_id == criterion.id)
                .map(|s| s.score_value)
                .collect();
            let judge_count = values.len() as u32;
            let aggregated = event.aggregation_method.aggregate(&values);

            if judge_count > 0 {
                any_scored = true;
            }
            if judge_count < active_judges {
                all_complete = false;
            }

            criterion_results.push(CriterionResult { criterion_id: criterion.id, aggregated, judge_count });
            contributions.push(CriterionContribution { aggregated, weight: criterion.weight, judge_count });
        }

        let final_score = weighted_final_score(&contributions);
        let completion_status = if !any_scored {
            CompletionStatus::None
        } else if all_complete {
            CompletionStatus::Complete
        } else {
            CompletionStatus::Partial
        };

        Ok(SubmissionResult {
            submission_id: submission.id,
            team_id: submission.team_id,
            criteria: criterion_results,
            final_score,
            completion_status,
        })
    }

    pub async fn category_result(&self, category_id: CategoryId) -> DomainResult<CategoryResult> {
        let category = self.categories.find_by_id(category_id, false).await?.ok_or_else(DomainError::not_found)?;
        let submissions = self.submissions.list_by_category(category_id, false).await?;

        let mut results = Vec::with_capacity(submissions.len());
        for submission in &submissions {
            results.push(self.compute_submission_result(submission, category.event_id).await?);
        }

        let scored: Vec<(SubmissionId, rust_decimal::Decimal)> =
            results.iter().map(|r| (r.submission_id, r.final_score)).collect();
        let ranked = rank_by_score(&scored);
        let rank_by_submission: HashMap<SubmissionId, u32> = ranked.into_iter().map(|r| (r.id, r.rank)).collect();

        let submissions = results
            .into_iter()
            .map(|r| {
                let rank = rank_by_submission[&r.submission_id];
                RankedSubmission { submission: r, rank }
            })
            .collect();

        Ok(CategoryResult { category_id, submissions })
    }

    pub async fn event_result(&self, event_id: EventId) -> DomainResult<EventResult> {
        self.events.find_by_id(event_id, false).await?.ok_or_else(DomainError::not_found)?;
        let categories = self.categories.list_by_event(event_id, false).await?;

        let mut category_results = Vec::with_capacity(categories.len());
        for category in &categories {
            category_results.push(self.category_result(category.id).await?);
        }

        let mut per_category_rows = Vec::new();
        for category_result in &category_results {
            for ranked in &category_result.submissions {
                per_category_rows.push((ranked.submission.team_id, ranked.rank, ranked.submission.final_score));
            }
        }

        let standings = accumulate_rank_sums(&per_category_rows);
        let overall = rank_overall(&standings)
            .into_iter()
            .map(|o| RankedTeamStanding { team_id: o.id, rank_sum: o.rank_sum, total_score: o.total_score, rank: o.rank })
            .collect();

        Ok(EventResult { categories: category_results, overall })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bbqjudge_core::{CriterionId, PageInfo, Pagination, ScoreId, SeatId, TableId, TeamId};
    use bbqjudge_entries::{Phase, Score};
    use bbqjudge_rubric::Criterion;
    use bbqjudge_scoring::AggregationMethod;
    use bbqjudge_statusmachine::SubmissionStatus;
    use bbqjudge_venue::Event;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct FakeEvents(Mutex<HashMap<EventId, Event>>);
    #[async_trait]
    impl EventRepository for FakeEvents {
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
    struct FakeSeats {
        active_count: Mutex<HashMap<EventId, u32>>,
    }
    #[async_trait]
    impl SeatRepository for FakeSeats {
        async fn create(&self, seat: bbqjudge_venue::Seat) -> DomainResult<bbqjudge_venue::Seat> {
            Ok(seat)
        }
        async fn update(&self, seat: bbqjudge_venue::Seat) -> DomainResult<bbqjudge_venue::Seat> {
            Ok(seat)
        }
        async fn find_by_id(&self, _id: SeatId, _include_deleted: bool) -> DomainResult<Option<bbqjudge_venue::Seat>> {
            Ok(None)
        }
        async fn find_by_seat_number(
            &self,
            _table_id: TableId,
            _seat_number: u32,
        ) -> DomainResult<Option<bbqjudge_venue::Seat>> {
            Ok(None)
        }
        async fn list_by_table(&self, _table_id: TableId, _include_deleted: bool) -> DomainResult<Vec<bbqjudge_venue::Seat>> {
            Ok(vec![])
        }
        async fn count_active_for_event(&self, event_id: EventId) -> DomainResult<u32> {
            Ok(*self.active_count.lock().unwrap().get(&event_id).unwrap_or(&0))
        }
    }

    #[derive(Default)]
    struct FakeCategories(Mutex<HashMap<CategoryId, bbqjudge_rubric::Category>>);
    #[async_trait]
    impl CategoryRepository for FakeCategories {
        async fn create(&self, category: bbqjudge_rubric::Category) -> DomainResult<bbqjudge_rubric::Category> {
            self.0.lock().unwrap().insert(category.id, category.clone());
            Ok(category)
        }
        async fn update(&self, category: bbqjudge_rubric::Category) -> DomainResult<bbqjudge_rubric::Category> {
            self.0.lock().unwrap().insert(category.id, category.clone());
            Ok(category)
        }
        async fn find_by_id(
            &self,
            id: CategoryId,
            _include_deleted: bool,
        ) -> DomainResult<Option<bbqjudge_rubric::Category>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn find_by_name(
            &self,
            _event_id: EventId,
            _name: &str,
        ) -> DomainResult<Option<bbqjudge_rubric::Category>> {
            Ok(None)
        }
        async fn list_by_event(
            &self,
            event_id: EventId,
            _include_deleted: bool,
        ) -> DomainResult<Vec<bbqjudge_rubric::Category>> {
            Ok(self.0.lock().unwrap().values().filter(|c| c.event_id == event_id).cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeCriteria(Mutex<HashMap<CriterionId, Criterion>>);
    #[async_trait]
    impl CriterionRepository for FakeCriteria {
        async fn create(&self, criterion: Criterion) -> DomainResult<Criterion> {
            self.0.lock().unwrap().insert(criterion.id, criterion.clone());
            Ok(criterion)
        }
        async fn update(&self, criterion: Criterion) -> DomainResult<Criterion> {
            self.0.lock().unwrap().insert(criterion.id, criterion.clone());
            Ok(criterion)
        }
        async fn find_by_id(&self, id: CriterionId, _include_deleted: bool) -> DomainResult<Option<Criterion>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn find_by_name(&self, _event_id: EventId, _name: &str) -> DomainResult<Option<Criterion>> {
            Ok(None)
        }
        async fn list_by_event(&self, event_id: EventId, _include_deleted: bool) -> DomainResult<Vec<Criterion>> {
            Ok(self.0.lock().unwrap().values().filter(|c| c.event_id == event_id).cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeSubmissions(Mutex<HashMap<SubmissionId, bbqjudge_entries::Submission>>);
    #[async_trait]
    impl SubmissionRepository for FakeSubmissions {
        async fn create(&self, submission: bbqjudge_entries::Submission) -> DomainResult<bbqjudge_entries::Submission> {
            self.0.lock().unwrap().insert(submission.id, submission.clone());
            Ok(submission)
        }
        async fn update(&self, submission: bbqjudge_entries::Submission) -> DomainResult<bbqjudge_entries::Submission> {
            self.0.lock().unwrap().insert(submission.id, submission.clone());
            Ok(submission)
        }
        async fn find_by_id(
            &self,
            id: SubmissionId,
            _include_deleted: bool,
        ) -> DomainResult<Option<bbqjudge_entries::Submission>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn find_by_team_and_category(
            &self,
            _team_id: TeamId,
            _category_id: CategoryId,
        ) -> DomainResult<Option<bbqjudge_entries::Submission>> {
            Ok(None)
        }
        async fn list_by_category(
            &self,
            category_id: CategoryId,
            _include_deleted: bool,
        ) -> DomainResult<Vec<bbqjudge_entries::Submission>> {
            Ok(self.0.lock().unwrap().values().filter(|s| s.category_id == category_id).cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeScores(Mutex<HashMap<ScoreId, Score>>);
    #[async_trait]
    impl ScoreRepository for FakeScores {
        async fn create(&self, score: Score) -> DomainResult<Score> {
            self.0.lock().unwrap().insert(score.id, score.clone());
            Ok(score)
        }
        async fn update(&self, score: Score) -> DomainResult<Score> {
            self.0.lock().unwrap().insert(score.id, score.clone());
            Ok(score)
        }
        async fn hard_delete(&self, id: ScoreId) -> DomainResult<()> {
            self.0.lock().unwrap().remove(&id);
            Ok(())
        }
        async fn find_by_id(&self, id: ScoreId) -> DomainResult<Option<Score>> {
            Ok(self.0.lock().unwrap().get(&id).cloned())
        }
        async fn find_by_submission_seat_criterion(
            &self,
            _submission_id: SubmissionId,
            _seat_id: SeatId,
            _criterion_id: CriterionId,
        ) -> DomainResult<Option<Score>> {
            Ok(None)
        }
        async fn list_by_submission(&self, submission_id: SubmissionId) -> DomainResult<Vec<Score>> {
            Ok(self.0.lock().unwrap().values().filter(|s| s.submission_id == submission_id).cloned().collect())
        }
        async fn list_by_seat_and_category(
            &self,
            _seat_id: SeatId,
            _category_id: CategoryId,
            _phase: Phase,
        ) -> DomainResult<Vec<Score>> {
            Ok(vec![])
        }
    }

    fn make_score(submission_id: SubmissionId, criterion_id: CriterionId, value: rust_decimal::Decimal) -> Score {
        let mut score = Score::empty(ScoreId::new());
        score.submission_id = submission_id;
        score.criterion_id = criterion_id;
        score.seat_id = SeatId::new();
        score.phase = Phase::Appearance;
        score.score_value = value;
        score
    }

    #[tokio::test]
    async fn submission_result_is_complete_when_every_active_judge_scored_every_criterion() {
        let events = Arc::new(FakeEvents::default());
        let mut event = Event::empty(EventId::new());
        event.scale = bbqjudge_core::ScoringScale::new(dec!(0), dec!(10), dec!(0.5)).unwrap();
        event.aggregation_method = AggregationMethod::Mean;
        let event_id = event.id;
        events.0.lock().unwrap().insert(event_id, event);

        let seats = Arc::new(FakeSeats::default());
        seats.active_count.lock().unwrap().insert(event_id, 1);

        let categories = Arc::new(FakeCategories::default());
        let mut category = bbqjudge_rubric::Category::empty(CategoryId::new());
        category.event_id = event_id;
        let category_id = category.id;
        categories.0.lock().unwrap().insert(category_id, category);

        let criteria = Arc::new(FakeCriteria::default());
        let mut criterion = Criterion::empty(CriterionId::new());
        criterion.event_id = event_id;
        criterion.weight = dec!(1);
        let criterion_id = criterion.id;
        criteria.0.lock().unwrap().insert(criterion_id, criterion);

        let submissions = Arc::new(FakeSubmissions::default());
        let mut submission = bbqjudge_entries::Submission::empty(SubmissionId::new());
        submission.category_id = category_id;
        submission.team_id = TeamId::new();
        submission.status = SubmissionStatus::Scored;
        let submission_id = submission.id;
        submissions.0.lock().unwrap().insert(submission_id, submission);

        let scores = Arc::new(FakeScores::default());
        let score = make_score(submission_id, criterion_id, dec!(8));
        scores.0.lock().unwrap().insert(score.id, score);

        let svc = ResultsService::new(events, seats, categories, criteria, submissions, scores);
        let result = svc.submission_result(submission_id).await.unwrap();
        assert_eq!(result.final_score, dec!(8));
        assert_eq!(result.completion_status, CompletionStatus::Complete);
    }

    #[tokio::test]
    async fn submission_result_is_none_when_nothing_scored() {
        let events = Arc::new(FakeEvents::default());
        let mut event = Event::empty(EventId::new());
        event.scale = bbqjudge_core::ScoringScale::new(dec!(0), dec!(10), dec!(0.5)).unwrap();
        let event_id = event.id;
        events.0.lock().unwrap().insert(event_id, event);

        let seats = Arc::new(FakeSeats::default());
        let categories = Arc::new(FakeCategories::default());
        let mut category = bbqjudge_rubric::Category::empty(CategoryId::new());
        category.event_id = event_id;
        let category_id = category.id;
        categories.0.lock().unwrap().insert(category_id, category);

        let criteria = Arc::new(FakeCriteria::default());
        let submissions = Arc::new(FakeSubmissions::default());
        let mut submission = bbqjudge_entries::Submission::empty(SubmissionId::new());
        submission.category_id = category_id;
        let submission_id = submission.id;
        submissions.0.lock().unwrap().insert(submission_id, submission);

        let scores = Arc::new(FakeScores::default());

        let svc = ResultsService::new(events, seats, categories, criteria, submissions, scores);
        let result = svc.submission_result(submission_id).await.unwrap();
        assert_eq!(result.completion_status, CompletionStatus::None);
    }
}
