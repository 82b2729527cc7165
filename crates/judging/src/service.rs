//! `JudgingService`: builds the per-category seat assignment plan and
//! answers "what's next for this seat" without ever persisting either.

use std::sync::Arc;

use bbqjudge_core::{CategoryId, DomainError, DomainResult, SeatId, TableId};
use bbqjudge_entries::{Phase, ScoreRepository, SubmissionRepository};
use bbqjudge_rubric::CategoryRepository;
use bbqjudge_scheduling::{generate_seat_sequence, hash_seed_str, round_robin_assign, shuffle_with_seed};
use bbqjudge_venue::{SeatRepository, TableRepository};

use crate::plan::{AssignmentPlan, SeatPlan, TablePlan};

/// Seats per table assumed when a table has none configured yet.
const DEFAULT_SEAT_COUNT: u32 = 6;

pub struct JudgingService {
    categories: Arc<dyn CategoryRepository>,
    tables: Arc<dyn TableRepository>,
    seats: Arc<dyn SeatRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl JudgingService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        tables: Arc<dyn TableRepository>,
        seats: Arc<dyn SeatRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self { categories, tables, seats, submissions, scores }
    }

    fn default_seed(event_id: bbqjudge_core::EventId, category_id: CategoryId) -> i64 {
        hash_seed_str(&format!("{event_id}:{category_id}")) as i64
    }

    pub async fn generate_assignment_plan(
        &self,
        category_id: CategoryId,
        seed: Option<i64>,
    ) -> DomainResult<AssignmentPlan> {
        let category = self.categories.find_by_id(category_id, false).await?.ok_or_else(DomainError::not_found)?;

        let mut submissions = self.submissions.list_by_category(category_id, false).await?;
        submissions.sort_by_key(|s| s.created_at);
        let submission_ids: Vec<_> = submissions.iter().map(|s| s.id).collect();

        let tables = self.tables.list_by_event(category.event_id, false).await?;
        let table_ids: Vec<TableId> = tables.iter().map(|t| t.id).collect();

        let seed = seed.unwrap_or_else(|| Self::default_seed(category.event_id, category_id));
        let shuffled: Vec<_> = shuffle_with_seed(&submission_ids, &seed.to_string());

        let assignments = round_robin_assign(&shuffled, &table_ids);

        let mut plan_tables = Vec::with_capacity(assignments.len());
        for (table_id, table_submissions) in assignments {
            let mut seats = self.seats.list_by_table(table_id, false).await?;
            seats.sort_by_key(|s| s.seat_number);
            let seat_count = if seats.is_empty() { DEFAULT_SEAT_COUNT } else { seats.len() as u32 };

            let n = table_submissions.len() as u32;
            let mut seat_plans = Vec::with_capacity(seats.len().max(seat_count as usize));

            let seat_numbers: Vec<(SeatId, u32)> = if seats.is_empty() {
                (1..=seat_count).map(|num| (SeatId::new(), num)).collect()
            } else {
                seats.iter().map(|s| (s.id, s.seat_number)).collect()
            };

            for (seat_id, seat_number) in seat_numbers {
                let sequence_numbers = generate_seat_sequence(seat_number, n, seat_count)
                    .map_err(|e| DomainError::validation(e.to_string()))?;
                let sequence = sequence_numbers
                    .into_iter()
                    .map(|num| table_submissions[(num - 1) as usize])
                    .collect();
                seat_plans.push(SeatPlan { seat_id, seat_number, sequence });
            }

            plan_tables.push(TablePlan { table_id, submissions: table_submissions, seats: seat_plans });
        }

        Ok(AssignmentPlan { tables: plan_tables })
    }

    /// The submission sequence a seat visits, and which of those it has not
    /// yet scored at all (across any criterion) in `phase`.
    ///
    /// Per §4.8, both phases order the table's submissions by creation time,
    /// not by the seeded-shuffle order the assignment plan distributes them
    /// in: the plan is only consulted here to learn *which* submissions are
    /// assigned to this table, never their order within it.
    pub async fn next_submission_for_seat(
        &self,
        category_id: CategoryId,
        table_id: TableId,
        seat_id: SeatId,
        phase: Phase,
    ) -> DomainResult<Option<bbqjudge_core::SubmissionId>> {
        self.categories.find_by_id(category_id, false).await?.ok_or_else(DomainError::not_found)?;
        let seat = self.seats.find_by_id(seat_id, false).await?.ok_or_else(DomainError::not_found)?;
        if seat.table_id != table_id {
            return Err(DomainError::validation("seat does not belong to the given table"));
        }

        let plan = self.generate_assignment_plan(category_id, None).await?;
        let table_plan = plan
            .tables
            .iter()
            .find(|t| t.table_id == table_id)
            .ok_or_else(DomainError::not_found)?;
        let assigned: std::collections::HashSet<_> = table_plan.submissions.iter().copied().collect();

        let mut submissions = self.submissions.list_by_category(category_id, false).await?;
        submissions.retain(|s| assigned.contains(&s.id));
        submissions.sort_by_key(|s| s.created_at);
        let creation_order: Vec<_> = submissions.iter().map(|s| s.id).collect();

        let sequence: Vec<_> = match phase {
            Phase::Appearance => creation_order,
            Phase::TasteTexture => {
                let mut seats = self.seats.list_by_table(table_id, false).await?;
                seats.sort_by_key(|s| s.seat_number);
                let seat_count = if seats.is_empty() { DEFAULT_SEAT_COUNT } else { seats.len() as u32 };
                let n = creation_order.len() as u32;
                let sequence_numbers = generate_seat_sequence(seat.seat_number, n, seat_count)
                    .map_err(|e| DomainError::validation(e.to_string()))?;
                sequence_numbers.into_iter().map(|num| creation_order[(num - 1) as usize]).collect()
            }
        };

        let scored = self.scores.list_by_seat_and_category(seat_id, category_id, phase).await?;
        let scored_submissions: std::collections::HashSet<_> = scored.iter().map(|s| s.submission_id).collect();

        Ok(sequence.into_iter().find(|id| !scored_submissions.contains(id)))
    }
}
