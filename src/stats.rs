//! Aggregate statistics over per-item metrics.
//!
//! Every metric kind reduces the same way: drop absent values, then take the
//! mean, median, and 90th percentile of what survives. An empty collection
//! reduces to `None`, never to a zero-valued summary, so callers can tell
//! "no data" from "all zero".

use chrono::Duration;

/// Mean / median / 90th percentile of a duration distribution,
/// rounded to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSummary {
    pub avg: Duration,
    pub med: Duration,
    pub p90: Duration,
}

/// Mean / median / 90th percentile of a count distribution,
/// rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountSummary {
    pub avg: f64,
    pub med: f64,
    pub p90: f64,
}

/// Reduce optional durations to a [`StatSummary`], or `None` if nothing
/// survives filtering.
pub fn summarize_durations<I>(values: I) -> Option<StatSummary>
where
    I: IntoIterator<Item = Option<Duration>>,
{
    let mut seconds: Vec<f64> = values
        .into_iter()
        .flatten()
        .map(|d| d.num_seconds() as f64)
        .collect();
    if seconds.is_empty() {
        return None;
    }
    seconds.sort_by(|a, b| a.partial_cmp(b).expect("durations are finite"));

    Some(StatSummary {
        avg: Duration::seconds(mean(&seconds).round() as i64),
        med: Duration::seconds(percentile(&seconds, 50.0).round() as i64),
        p90: Duration::seconds(percentile(&seconds, 90.0).round() as i64),
    })
}

/// Reduce optional counts to a [`CountSummary`], or `None` if nothing
/// survives filtering.
pub fn summarize_counts<I>(values: I) -> Option<CountSummary>
where
    I: IntoIterator<Item = Option<usize>>,
{
    let mut counts: Vec<f64> = values.into_iter().flatten().map(|c| c as f64).collect();
    if counts.is_empty() {
        return None;
    }
    counts.sort_by(|a, b| a.partial_cmp(b).expect("counts are finite"));

    Some(CountSummary {
        avg: round_tenth(mean(&counts)),
        med: round_tenth(percentile(&counts, 50.0)),
        p90: round_tenth(percentile(&counts, 90.0)),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolation percentile over a sorted slice, matching the default
/// of standard statistical libraries.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
