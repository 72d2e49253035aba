//! Time spent with each label applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::intervals::{fold_state_changes, StateChange};
use crate::item::{Item, ItemMetrics, LabelEventKind};
use crate::stats::{summarize_durations, StatSummary};

/// Measure how long each label in `labels` was applied to `item`.
///
/// The result always has one entry per requested label. A label whose events
/// all fall at or after closure, or that never saw an event, maps to `None`.
pub fn get_label_metrics(
    item: &Item,
    labels: &[String],
    now: DateTime<Utc>,
) -> BTreeMap<String, Option<Duration>> {
    let mut metrics = BTreeMap::new();

    for label in labels {
        let changes: Vec<StateChange> = item
            .label_events
            .iter()
            .filter(|event| &event.label == label)
            .map(|event| StateChange {
                entered: event.kind == LabelEventKind::Applied,
                at: event.created_at,
            })
            .collect();

        let folded = fold_state_changes(&changes, item.closed_at);
        metrics.insert(label.clone(), folded.resolve_clipped(item.closed_at, now));
    }

    metrics
}

/// Summarize time-in-label across items, independently per label.
///
/// Labels with no surviving values across all items get no entry.
pub fn get_stats_time_in_labels(records: &[ItemMetrics]) -> BTreeMap<String, StatSummary> {
    let mut per_label: BTreeMap<String, Vec<Option<Duration>>> = BTreeMap::new();
    for record in records {
        if let Some(durations) = &record.label_durations {
            for (label, duration) in durations {
                per_label
                    .entry(label.clone())
                    .or_default()
                    .push(*duration);
            }
        }
    }

    per_label
        .into_iter()
        .filter_map(|(label, durations)| {
            summarize_durations(durations).map(|summary| (label, summary))
        })
        .collect()
}
