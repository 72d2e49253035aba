//! Per-item metric collection and whole-run aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::item::{Item, ItemKind, ItemMetrics};
use crate::labels::{get_label_metrics, get_stats_time_in_labels};
use crate::most_active_mentors::{count_comments_per_user, get_mentor_count};
use crate::pr_comments::{count_pr_comments, get_stats_pr_comments};
use crate::stats::{summarize_durations, CountSummary, StatSummary};
use crate::time_in_draft::measure_time_in_draft;
use crate::time_to_answer::measure_time_to_answer;
use crate::time_to_close::{
    get_time_to_ready_for_review, measure_time_to_close, measure_time_to_merge,
};
use crate::time_to_first_response::measure_time_to_first_response;

/// The complete output of one run: per-item records plus every aggregate.
#[derive(Debug, Clone)]
pub struct Report {
    pub items: Vec<ItemMetrics>,
    pub num_open: usize,
    pub num_closed: usize,
    pub stats_time_to_first_response: Option<StatSummary>,
    pub stats_time_to_close: Option<StatSummary>,
    pub stats_time_to_answer: Option<StatSummary>,
    pub stats_time_in_draft: Option<StatSummary>,
    /// Per-label summaries; labels with no data have no entry.
    pub stats_time_in_labels: BTreeMap<String, StatSummary>,
    pub stats_pr_comments: Option<CountSummary>,
    /// Present only when mentor counting is enabled.
    pub mentor_count: Option<usize>,
}

/// Populate one metric record for `item`. `now` anchors any still-open
/// interval so runs are deterministic under test.
pub fn build_item_metrics(item: &Item, config: &AppConfig, now: DateTime<Utc>) -> ItemMetrics {
    let mut record = ItemMetrics::new(item);

    let ready_for_review_at = item.pull().and_then(get_time_to_ready_for_review);

    record.time_to_first_response = measure_time_to_first_response(
        item,
        ready_for_review_at,
        &config.ignore_users,
        config.first_response_scan_limit,
    );

    if config.enable_mentor_count {
        record.mentor_activity = Some(count_comments_per_user(
            item,
            ready_for_review_at,
            &config.ignore_users,
            config.max_comments_to_eval,
            config.heavily_involved_cutoff,
        ));
    }

    match &item.kind {
        ItemKind::PullRequest(pull) => {
            // PRs report time to merge in the close column.
            record.time_to_close = measure_time_to_merge(pull, item.created_at, ready_for_review_at);
            if config.draft_pr_tracking {
                record.time_in_draft = measure_time_in_draft(item, pull, now);
            }
        }
        ItemKind::Issue | ItemKind::Discussion { .. } => {
            record.time_to_close = measure_time_to_close(item);
        }
    }

    record.time_to_answer = measure_time_to_answer(item);
    record.pr_comment_count = count_pr_comments(item, &config.ignore_users);

    if !config.labels_to_measure.is_empty() && !matches!(item.kind, ItemKind::Discussion { .. }) {
        record.label_durations = Some(get_label_metrics(item, &config.labels_to_measure, now));
    }

    record
}

/// Run every extractor over every item, then reduce each metric kind.
pub fn build_report(items: &[Item], config: &AppConfig, now: DateTime<Utc>) -> Report {
    let mut records = Vec::with_capacity(items.len());
    let mut num_open = 0;
    let mut num_closed = 0;

    for item in items {
        if item.is_closed() {
            num_closed += 1;
        } else {
            num_open += 1;
        }
        records.push(build_item_metrics(item, config, now));
    }

    let stats_time_to_first_response =
        summarize_durations(records.iter().map(|r| r.time_to_first_response));
    let stats_time_to_close = summarize_durations(records.iter().map(|r| r.time_to_close));
    let stats_time_to_answer = summarize_durations(records.iter().map(|r| r.time_to_answer));
    let stats_time_in_draft = summarize_durations(records.iter().map(|r| r.time_in_draft));
    let stats_time_in_labels = get_stats_time_in_labels(&records);
    let stats_pr_comments = get_stats_pr_comments(&records);

    let mentor_count = config
        .enable_mentor_count
        .then(|| get_mentor_count(&records, config.min_mentor_comments));

    Report {
        items: records,
        num_open,
        num_closed,
        stats_time_to_first_response,
        stats_time_to_close,
        stats_time_to_answer,
        stats_time_in_draft,
        stats_time_in_labels,
        stats_pr_comments,
        mentor_count,
    }
}
