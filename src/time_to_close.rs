//! Time to close, time to merge, and the ready-for-review cutoff.

use chrono::{DateTime, Duration, Utc};

use crate::item::{DraftEventKind, Item, PullContext};

/// Closure timestamp minus creation, `None` while the item is open.
pub fn measure_time_to_close(item: &Item) -> Option<Duration> {
    item.closed_at.map(|closed| closed - item.created_at)
}

/// Merge timestamp minus the ready-for-review cutoff if the PR was ever a
/// draft, else minus creation. `None` if never merged.
pub fn measure_time_to_merge(
    pull: &PullContext,
    created_at: DateTime<Utc>,
    ready_for_review_at: Option<DateTime<Utc>>,
) -> Option<Duration> {
    pull.merged_at
        .map(|merged| merged - ready_for_review_at.unwrap_or(created_at))
}

/// When a formerly-draft PR was marked ready for review.
///
/// `None` if the PR is currently a draft or was never one.
pub fn get_time_to_ready_for_review(pull: &PullContext) -> Option<DateTime<Utc>> {
    if pull.is_draft {
        return None;
    }
    pull.draft_events
        .iter()
        .find(|event| event.kind == DraftEventKind::ReadyForReview)
        .map(|event| event.created_at)
}
