//! Participation tally for finding the project's most active mentors.
//!
//! Per item we count qualifying comments and reviews per participant,
//! capping one participant's contribution so a single contested thread
//! cannot dominate the ranking. The scan also stops after a bounded number
//! of comments/reviews per item; that bound is a sampling cost control, not
//! a correctness guarantee.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::item::{Item, ItemMetrics};
use crate::time_to_first_response::ignore_comment;

/// Histogram of participant login -> qualifying-comment count for one item.
///
/// Applies the shared exclusion rule, scans at most `max_comments_to_eval`
/// comments and reviews, and caps each participant at `heavily_involved`.
pub fn count_comments_per_user(
    item: &Item,
    ready_for_review_at: Option<DateTime<Utc>>,
    ignore_users: &[String],
    max_comments_to_eval: usize,
    heavily_involved: u32,
) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();

    let mut tally = |author: &str, is_bot: bool, at: Option<DateTime<Utc>>| {
        if ignore_comment(
            &item.author,
            author,
            is_bot,
            ignore_users,
            at,
            ready_for_review_at,
        ) {
            return;
        }
        let count = counts.entry(author.to_string()).or_insert(0);
        if *count < heavily_involved {
            *count += 1;
        }
    };

    for comment in item.comments.iter().take(max_comments_to_eval) {
        tally(&comment.author, comment.author_is_bot, Some(comment.created_at));
    }

    if let Some(pull) = item.pull() {
        for review in pull.reviews.iter().take(max_comments_to_eval) {
            tally(&review.author, review.author_is_bot, review.submitted_at);
        }
    }

    counts
}

/// Number of distinct participants whose summed per-item counts reach
/// `min_comments` across all items. Per-item caps apply before the sum;
/// totals are not re-capped.
pub fn get_mentor_count(records: &[ItemMetrics], min_comments: u32) -> usize {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for record in records {
        if let Some(activity) = &record.mentor_activity {
            for (user, count) in activity {
                *totals.entry(user.as_str()).or_insert(0) += count;
            }
        }
    }

    totals.values().filter(|count| **count >= min_comments).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Comment, ItemKind, PullContext, Review};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, d, 0, 0, 0).unwrap()
    }

    fn comment(author: &str, d: u32) -> Comment {
        Comment {
            author: author.to_string(),
            author_is_bot: false,
            created_at: day(d),
        }
    }

    fn item(comments: Vec<Comment>) -> Item {
        Item {
            title: "t".to_string(),
            url: "https://github.com/o/r/issues/1".to_string(),
            author: "alice".to_string(),
            assignees: vec![],
            created_at: day(1),
            closed_at: None,
            status: None,
            comments,
            label_events: vec![],
            kind: ItemKind::Issue,
        }
    }

    #[test]
    fn prolific_commenter_is_capped_per_item() {
        let comments = (0..22).map(|i| comment("bob", 2 + i % 20)).collect();
        let counts = count_comments_per_user(&item(comments), None, &[], 50, 3);
        assert_eq!(counts["bob"], 3);
    }

    #[test]
    fn cross_item_totals_sum_capped_values() {
        let per_item: HashMap<String, u32> = [("bob".to_string(), 3)].into();
        let mut record_a = ItemMetrics::new(&item(vec![]));
        record_a.mentor_activity = Some(per_item.clone());
        let mut record_b = ItemMetrics::new(&item(vec![]));
        record_b.mentor_activity = Some(per_item);

        // 3 + 3 = 6: counted at threshold 6, not at 7.
        assert_eq!(get_mentor_count(&[record_a.clone(), record_b.clone()], 6), 1);
        assert_eq!(get_mentor_count(&[record_a, record_b], 7), 0);
    }

    #[test]
    fn excluded_users_never_enter_the_histogram() {
        let counts = count_comments_per_user(
            &item(vec![
                comment("alice", 2), // item author
                Comment {
                    author_is_bot: true,
                    ..comment("ci-bot", 3)
                },
                comment("spammer", 4),
                comment("bob", 5),
            ]),
            None,
            &["spammer".to_string()],
            50,
            3,
        );
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["bob"], 1);
    }

    #[test]
    fn reviews_count_and_are_capped_too() {
        let mut base = item(vec![]);
        base.kind = ItemKind::PullRequest(PullContext {
            reviews: (0..5)
                .map(|i| Review {
                    author: "carol".to_string(),
                    author_is_bot: false,
                    submitted_at: Some(day(2 + i)),
                })
                .collect(),
            ..Default::default()
        });
        let counts = count_comments_per_user(&base, None, &[], 50, 3);
        assert_eq!(counts["carol"], 3);
    }

    #[test]
    fn scan_bound_limits_evaluated_comments() {
        let comments = (0..10).map(|i| comment("bob", 2 + i)).collect();
        let counts = count_comments_per_user(&item(comments), None, &[], 2, 10);
        assert_eq!(counts["bob"], 2);
    }

    #[test]
    fn comments_before_cutoff_are_excluded() {
        let counts = count_comments_per_user(
            &item(vec![comment("bob", 2), comment("bob", 6)]),
            Some(day(4)),
            &[],
            50,
            3,
        );
        assert_eq!(counts["bob"], 1);
    }
}
