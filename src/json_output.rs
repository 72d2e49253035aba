//! JSON report rendering.
//!
//! The document carries the avg/med/p90 rows per metric kind, per-label
//! maps, open/closed/total counts, a flat per-item list, and the search
//! query that produced the run. Durations are emitted as whole seconds
//! (`null` when absent) so downstream consumers do math, not parsing.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::config::AppConfig;
use crate::item::ItemMetrics;
use crate::report::Report;
use crate::stats::StatSummary;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    average_time_to_first_response: Option<i64>,
    median_time_to_first_response: Option<i64>,
    p90_time_to_first_response: Option<i64>,
    average_time_to_close: Option<i64>,
    median_time_to_close: Option<i64>,
    p90_time_to_close: Option<i64>,
    average_time_to_answer: Option<i64>,
    median_time_to_answer: Option<i64>,
    p90_time_to_answer: Option<i64>,
    average_time_in_draft: Option<i64>,
    median_time_in_draft: Option<i64>,
    p90_time_in_draft: Option<i64>,
    average_time_in_labels: BTreeMap<&'a str, i64>,
    median_time_in_labels: BTreeMap<&'a str, i64>,
    p90_time_in_labels: BTreeMap<&'a str, i64>,
    average_pr_comments: Option<f64>,
    median_pr_comments: Option<f64>,
    p90_pr_comments: Option<f64>,
    num_items_opened: usize,
    num_items_closed: usize,
    num_mentor_count: Option<usize>,
    total_item_count: usize,
    items: Vec<JsonItem<'a>>,
    search_query: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonItem<'a> {
    title: &'a str,
    html_url: &'a str,
    author: &'a str,
    assignees: &'a [String],
    status: Option<&'a str>,
    created_at: String,
    time_to_first_response: Option<i64>,
    time_to_close: Option<i64>,
    time_to_answer: Option<i64>,
    time_in_draft: Option<i64>,
    label_metrics: BTreeMap<&'a str, Option<i64>>,
    pr_comment_count: Option<usize>,
}

fn seconds(duration: Option<Duration>) -> Option<i64> {
    duration.map(|d| d.num_seconds())
}

fn stat_field(summary: Option<StatSummary>, pick: fn(StatSummary) -> Duration) -> Option<i64> {
    summary.map(|s| pick(s).num_seconds())
}

fn label_stat_map(
    stats: &BTreeMap<String, StatSummary>,
    pick: fn(StatSummary) -> Duration,
) -> BTreeMap<&str, i64> {
    stats
        .iter()
        .map(|(label, summary)| (label.as_str(), pick(*summary).num_seconds()))
        .collect()
}

fn json_item(record: &ItemMetrics) -> JsonItem<'_> {
    JsonItem {
        title: &record.title,
        html_url: &record.url,
        author: &record.author,
        assignees: &record.assignees,
        status: record.status.as_deref(),
        created_at: record.created_at.to_rfc3339(),
        time_to_first_response: seconds(record.time_to_first_response),
        time_to_close: seconds(record.time_to_close),
        time_to_answer: seconds(record.time_to_answer),
        time_in_draft: seconds(record.time_in_draft),
        label_metrics: record
            .label_durations
            .as_ref()
            .map(|durations| {
                durations
                    .iter()
                    .map(|(label, duration)| (label.as_str(), seconds(*duration)))
                    .collect()
            })
            .unwrap_or_default(),
        pr_comment_count: record.pr_comment_count,
    }
}

/// Serialize the report to a pretty-printed JSON document.
pub fn write_to_json(report: &Report, config: &AppConfig) -> serde_json::Result<String> {
    let document = JsonReport {
        average_time_to_first_response: stat_field(report.stats_time_to_first_response, |s| s.avg),
        median_time_to_first_response: stat_field(report.stats_time_to_first_response, |s| s.med),
        p90_time_to_first_response: stat_field(report.stats_time_to_first_response, |s| s.p90),
        average_time_to_close: stat_field(report.stats_time_to_close, |s| s.avg),
        median_time_to_close: stat_field(report.stats_time_to_close, |s| s.med),
        p90_time_to_close: stat_field(report.stats_time_to_close, |s| s.p90),
        average_time_to_answer: stat_field(report.stats_time_to_answer, |s| s.avg),
        median_time_to_answer: stat_field(report.stats_time_to_answer, |s| s.med),
        p90_time_to_answer: stat_field(report.stats_time_to_answer, |s| s.p90),
        average_time_in_draft: stat_field(report.stats_time_in_draft, |s| s.avg),
        median_time_in_draft: stat_field(report.stats_time_in_draft, |s| s.med),
        p90_time_in_draft: stat_field(report.stats_time_in_draft, |s| s.p90),
        average_time_in_labels: label_stat_map(&report.stats_time_in_labels, |s| s.avg),
        median_time_in_labels: label_stat_map(&report.stats_time_in_labels, |s| s.med),
        p90_time_in_labels: label_stat_map(&report.stats_time_in_labels, |s| s.p90),
        average_pr_comments: report.stats_pr_comments.map(|s| s.avg),
        median_pr_comments: report.stats_pr_comments.map(|s| s.med),
        p90_pr_comments: report.stats_pr_comments.map(|s| s.p90),
        num_items_opened: report.num_open,
        num_items_closed: report.num_closed,
        num_mentor_count: report.mentor_count,
        total_item_count: report.items.len(),
        items: report.items.iter().map(json_item).collect(),
        search_query: &config.search_query,
    };

    serde_json::to_string_pretty(&document)
}
