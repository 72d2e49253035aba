//! Cumulative time a pull request spent in draft state.

use chrono::{DateTime, Duration, Utc};

use crate::intervals::{fold_state_changes, StateChange};
use crate::item::{DraftEventKind, Item, PullContext};

/// Total time `item` spent as a draft, or `None` if it never measurably was.
///
/// Draft intervals come from converted_to_draft / ready_for_review events. A
/// PR whose first draft-related event is ready_for_review is inferred to have
/// been created in draft, so that interval starts at creation. A PR that is
/// still a draft with no events at all is in one open interval since
/// creation. Open intervals are measured against `now` only while the item
/// is open; closure does not resolve a draft.
pub fn measure_time_in_draft(
    item: &Item,
    pull: &PullContext,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let mut changes: Vec<StateChange> = Vec::with_capacity(pull.draft_events.len() + 1);

    // Created-as-draft inference: a ready_for_review with no prior
    // converted_to_draft means the draft interval opened at creation.
    if pull
        .draft_events
        .first()
        .is_some_and(|event| event.kind == DraftEventKind::ReadyForReview)
    {
        changes.push(StateChange {
            entered: true,
            at: item.created_at,
        });
    }

    changes.extend(pull.draft_events.iter().map(|event| StateChange {
        entered: event.kind == DraftEventKind::ConvertedToDraft,
        at: event.created_at,
    }));

    let folded = fold_state_changes(&changes, item.closed_at);

    let mut total = folded.closed_total;
    if let Some(start) = folded.open_since {
        if !item.is_closed() {
            total = total + (now - start);
        }
    } else if changes.is_empty() && pull.is_draft && !item.is_closed() {
        // Still a draft since creation, with nothing in the event stream.
        total = now - item.created_at;
    }

    if total > Duration::zero() {
        Some(total)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DraftEvent, ItemKind};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, d, 0, 0, 0).unwrap()
    }

    fn draft_event(kind: DraftEventKind, d: u32) -> DraftEvent {
        DraftEvent {
            kind,
            created_at: day(d),
        }
    }

    fn pr(closed: Option<u32>, pull: PullContext) -> (Item, PullContext) {
        let item = Item {
            title: "t".to_string(),
            url: "https://github.com/o/r/pull/1".to_string(),
            author: "alice".to_string(),
            assignees: vec![],
            created_at: day(1),
            closed_at: closed.map(day),
            status: None,
            comments: vec![],
            label_events: vec![],
            kind: ItemKind::PullRequest(pull.clone()),
        };
        (item, pull)
    }

    #[test]
    fn created_as_draft_then_marked_ready() {
        let (item, pull) = pr(
            None,
            PullContext {
                draft_events: vec![draft_event(DraftEventKind::ReadyForReview, 3)],
                ..Default::default()
            },
        );
        assert_eq!(
            measure_time_in_draft(&item, &pull, day(20)),
            Some(Duration::days(2))
        );
    }

    #[test]
    fn convert_and_ready_cycles_sum() {
        let (item, pull) = pr(
            None,
            PullContext {
                draft_events: vec![
                    draft_event(DraftEventKind::ConvertedToDraft, 2),
                    draft_event(DraftEventKind::ReadyForReview, 3),
                    draft_event(DraftEventKind::ConvertedToDraft, 5),
                    draft_event(DraftEventKind::ReadyForReview, 9),
                ],
                ..Default::default()
            },
        );
        assert_eq!(
            measure_time_in_draft(&item, &pull, day(20)),
            Some(Duration::days(5))
        );
    }

    #[test]
    fn currently_draft_open_pr_measures_to_now() {
        let (item, pull) = pr(
            None,
            PullContext {
                is_draft: true,
                draft_events: vec![draft_event(DraftEventKind::ConvertedToDraft, 4)],
                ..Default::default()
            },
        );
        assert_eq!(
            measure_time_in_draft(&item, &pull, day(10)),
            Some(Duration::days(6))
        );
    }

    #[test]
    fn still_draft_with_no_events_counts_from_creation() {
        let (item, pull) = pr(
            None,
            PullContext {
                is_draft: true,
                ..Default::default()
            },
        );
        assert_eq!(
            measure_time_in_draft(&item, &pull, day(8)),
            Some(Duration::days(7))
        );
    }

    #[test]
    fn closed_item_does_not_resolve_an_open_draft() {
        // Converted to draft, then closed while still a draft: the dangling
        // interval is unknown, not clipped to closure.
        let (item, pull) = pr(
            Some(6),
            PullContext {
                is_draft: true,
                draft_events: vec![draft_event(DraftEventKind::ConvertedToDraft, 4)],
                ..Default::default()
            },
        );
        assert_eq!(measure_time_in_draft(&item, &pull, day(20)), None);
    }

    #[test]
    fn closed_item_keeps_resolved_intervals() {
        let (item, pull) = pr(
            Some(9),
            PullContext {
                draft_events: vec![
                    draft_event(DraftEventKind::ConvertedToDraft, 2),
                    draft_event(DraftEventKind::ReadyForReview, 4),
                ],
                ..Default::default()
            },
        );
        assert_eq!(
            measure_time_in_draft(&item, &pull, day(20)),
            Some(Duration::days(2))
        );
    }

    #[test]
    fn never_draft_is_none() {
        let (item, pull) = pr(None, PullContext::default());
        assert_eq!(measure_time_in_draft(&item, &pull, day(20)), None);
    }
}
