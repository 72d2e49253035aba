//! Markdown report rendering.
//!
//! One summary table (average / median / 90th percentile per metric), one
//! counts table, then a flat per-item table whose columns honor the HIDE_*
//! configuration flags.

use std::fmt::Write as _;

use crate::config::AppConfig;
use crate::duration_fmt::format_optional_duration;
use crate::report::Report;
use crate::stats::StatSummary;

/// Column headers that survive the hide flags, in display order.
pub fn get_non_hidden_columns(config: &AppConfig) -> Vec<String> {
    let mut columns = vec!["Title".to_string(), "URL".to_string()];

    if !config.hide_assignee {
        columns.push("Assignee".to_string());
    }
    if !config.hide_author {
        columns.push("Author".to_string());
    }
    if !config.hide_time_to_first_response {
        columns.push("Time to first response".to_string());
    }
    if !config.hide_time_to_close {
        columns.push("Time to close".to_string());
    }
    if !config.hide_time_to_answer {
        columns.push("Time to answer".to_string());
    }
    if !config.hide_status {
        columns.push("Status".to_string());
    }
    if config.draft_pr_tracking {
        columns.push("Time in draft".to_string());
    }
    if !config.hide_label_metrics {
        for label in &config.labels_to_measure {
            columns.push(format!("Time spent in {label}"));
        }
    }
    if !config.hide_created_at {
        columns.push("Created At".to_string());
    }

    columns
}

/// Render the whole report as Markdown.
pub fn write_to_markdown(report: &Report, config: &AppConfig) -> String {
    let mut out = String::new();
    let columns = get_non_hidden_columns(config);

    let _ = writeln!(out, "# {}\n", config.report_title);

    if report.items.is_empty() {
        out.push_str("no items found for the given search criteria\n\n");
        push_footer(&mut out, config);
        return out;
    }

    write_summary_tables(&mut out, report, config, &columns);
    write_item_table(&mut out, report, config, &columns);
    push_footer(&mut out, config);

    out
}

fn write_summary_tables(out: &mut String, report: &Report, config: &AppConfig, columns: &[String]) {
    let has = |name: &str| columns.iter().any(|column| column == name);

    let any_duration_metric = has("Time to first response")
        || has("Time to close")
        || has("Time to answer")
        || has("Time in draft");
    let label_rows = !config.hide_label_metrics && !config.labels_to_measure.is_empty();

    if any_duration_metric || label_rows {
        out.push_str("| Metric | Average | Median | 90th percentile |\n");
        out.push_str("| --- | --- | --- | ---: |\n");
        if has("Time to first response") {
            push_stat_row(out, "Time to first response", report.stats_time_to_first_response);
        }
        if has("Time to close") {
            push_stat_row(out, "Time to close", report.stats_time_to_close);
        }
        if has("Time to answer") {
            push_stat_row(out, "Time to answer", report.stats_time_to_answer);
        }
        if has("Time in draft") {
            push_stat_row(out, "Time in draft", report.stats_time_in_draft);
        }
        if label_rows {
            for label in &config.labels_to_measure {
                push_stat_row(
                    out,
                    &format!("Time spent in {label}"),
                    report.stats_time_in_labels.get(label).copied(),
                );
            }
        }
        out.push('\n');
    }

    if let Some(stats) = report.stats_pr_comments {
        out.push_str("| Metric | Average | Median | 90th percentile |\n");
        out.push_str("| --- | --- | --- | ---: |\n");
        let _ = writeln!(
            out,
            "| PR comments | {} | {} | {} |",
            stats.avg, stats.med, stats.p90
        );
        out.push('\n');
    }

    out.push_str("| Metric | Count |\n");
    out.push_str("| --- | ---: |\n");
    let _ = writeln!(out, "| Number of items that remain open | {} |", report.num_open);
    if !config.hide_items_closed_count {
        let _ = writeln!(out, "| Number of items closed | {} |", report.num_closed);
    }
    if let Some(mentors) = report.mentor_count {
        let _ = writeln!(out, "| Number of most active mentors | {mentors} |");
    }
    let _ = writeln!(
        out,
        "| Total number of items created | {} |\n",
        report.items.len()
    );
}

fn push_stat_row(out: &mut String, name: &str, summary: Option<StatSummary>) {
    match summary {
        Some(summary) => {
            let _ = writeln!(
                out,
                "| {name} | {} | {} | {} |",
                format_optional_duration(Some(summary.avg)),
                format_optional_duration(Some(summary.med)),
                format_optional_duration(Some(summary.p90)),
            );
        }
        None => {
            let _ = writeln!(out, "| {name} | None | None | None |");
        }
    }
}

fn write_item_table(out: &mut String, report: &Report, config: &AppConfig, columns: &[String]) {
    let _ = writeln!(out, "| {} |", columns.join(" | "));
    let _ = writeln!(out, "|{}", " --- |".repeat(columns.len()));

    for item in &report.items {
        // Keep the table shape intact: bars in titles become entities.
        let title = item.title.trim().replace('|', "&#124;");
        let url = if config.non_mentioning_links {
            item.url.replace("https://github.com", "https://www.github.com")
        } else {
            item.url.clone()
        };

        let _ = write!(out, "| {title} | {url} |");
        if !config.hide_assignee {
            if item.assignees.is_empty() {
                out.push_str(" None |");
            } else {
                let links: Vec<String> = item
                    .assignees
                    .iter()
                    .map(|assignee| format!("[{assignee}](https://github.com/{assignee})"))
                    .collect();
                let _ = write!(out, " {} |", links.join(", "));
            }
        }
        if !config.hide_author {
            let _ = write!(out, " [{}](https://github.com/{}) |", item.author, item.author);
        }
        if !config.hide_time_to_first_response {
            let _ = write!(out, " {} |", format_optional_duration(item.time_to_first_response));
        }
        if !config.hide_time_to_close {
            let _ = write!(out, " {} |", format_optional_duration(item.time_to_close));
        }
        if !config.hide_time_to_answer {
            let _ = write!(out, " {} |", format_optional_duration(item.time_to_answer));
        }
        if !config.hide_status {
            let _ = write!(out, " {} |", item.status.as_deref().unwrap_or("None"));
        }
        if config.draft_pr_tracking {
            let _ = write!(out, " {} |", format_optional_duration(item.time_in_draft));
        }
        if !config.hide_label_metrics {
            for label in &config.labels_to_measure {
                let duration = item
                    .label_durations
                    .as_ref()
                    .and_then(|durations| durations.get(label).copied())
                    .flatten();
                let _ = write!(out, " {} |", format_optional_duration(duration));
            }
        }
        if !config.hide_created_at {
            let _ = write!(out, " {} |", item.created_at.format("%Y-%m-%dT%H:%M:%SZ"));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn push_footer(out: &mut String, config: &AppConfig) {
    let _ = writeln!(
        out,
        "Search query used to find these items: `{}`",
        config.search_query
    );
}
