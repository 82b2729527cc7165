//! Distribution of shuffled submissions across judging tables.

use std::collections::BTreeMap;

use bbqjudge_core::{SubmissionId, TableId};

/// Deal `submission_ids` round-robin across `table_ids`, in the order given.
///
/// Tables that receive no submissions (more tables than submissions) are
/// omitted from the result rather than mapped to an empty vector.
pub fn round_robin_assign(
    submission_ids: &[SubmissionId],
    table_ids: &[TableId],
) -> BTreeMap<TableId, Vec<SubmissionId>> {
    let mut plan: BTreeMap<TableId, Vec<SubmissionId>> = BTreeMap::new();
    if table_ids.is_empty() {
        return plan;
    }

    for (i, submission_id) in submission_ids.iter().enumerate() {
        let table_id = table_ids[i % table_ids.len()];
        plan.entry(table_id).or_default().push(*submission_id);
    }
    plan
}
