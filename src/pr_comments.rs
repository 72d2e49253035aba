//! Comment volume on pull requests.

use crate::item::{Item, ItemMetrics};
use crate::stats::{summarize_counts, CountSummary};

/// Count all thread comments plus all reviews on a pull request, excluding
/// bot authors and ignored users. No per-user cap and no ready-for-review
/// cutoff, unlike the mentor tally. `None` when the item is not a PR.
pub fn count_pr_comments(item: &Item, ignore_users: &[String]) -> Option<usize> {
    let pull = item.pull()?;

    let not_ignored = |author: &str, is_bot: bool| {
        !is_bot && !ignore_users.iter().any(|user| user == author)
    };

    let thread_comments = item
        .comments
        .iter()
        .filter(|c| not_ignored(&c.author, c.author_is_bot))
        .count();
    let review_comments = pull
        .reviews
        .iter()
        .filter(|r| not_ignored(&r.author, r.author_is_bot))
        .count();

    Some(thread_comments + review_comments)
}

/// Summarize PR comment counts across items; `None` when no item is a PR.
pub fn get_stats_pr_comments(records: &[ItemMetrics]) -> Option<CountSummary> {
    summarize_counts(records.iter().map(|record| record.pr_comment_count))
}
