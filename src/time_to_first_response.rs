//! Time from creation (or ready-for-review) to the first qualifying response.

use chrono::{DateTime, Duration, Utc};

use crate::item::Item;

/// Shared exclusion rule for response and mentor scans.
///
/// A comment or review does not qualify when its author is the item's own
/// author, a bot, or on the ignore list; when it has no timestamp (pending
/// review); or when it predates the ready-for-review cutoff.
pub fn ignore_comment(
    item_author: &str,
    comment_author: &str,
    author_is_bot: bool,
    ignore_users: &[String],
    commented_at: Option<DateTime<Utc>>,
    ready_for_review_at: Option<DateTime<Utc>>,
) -> bool {
    if author_is_bot || comment_author == item_author {
        return true;
    }
    if ignore_users.iter().any(|user| user == comment_author) {
        return true;
    }
    match commented_at {
        None => true,
        Some(at) => ready_for_review_at.is_some_and(|cutoff| at < cutoff),
    }
}

/// Earliest qualifying comment or review timestamp minus the effective start
/// time (`ready_for_review_at` when supplied, else creation).
///
/// Scans at most `scan_limit` comments and `scan_limit` reviews; `None` when
/// nothing within the window qualifies.
pub fn measure_time_to_first_response(
    item: &Item,
    ready_for_review_at: Option<DateTime<Utc>>,
    ignore_users: &[String],
    scan_limit: usize,
) -> Option<Duration> {
    let first_comment = item
        .comments
        .iter()
        .take(scan_limit)
        .find(|comment| {
            !ignore_comment(
                &item.author,
                &comment.author,
                comment.author_is_bot,
                ignore_users,
                Some(comment.created_at),
                ready_for_review_at,
            )
        })
        .map(|comment| comment.created_at);

    let first_review = item.pull().and_then(|pull| {
        pull.reviews
            .iter()
            .take(scan_limit)
            .find(|review| {
                !ignore_comment(
                    &item.author,
                    &review.author,
                    review.author_is_bot,
                    ignore_users,
                    review.submitted_at,
                    ready_for_review_at,
                )
            })
            .and_then(|review| review.submitted_at)
    });

    let earliest = match (first_comment, first_review) {
        (Some(comment), Some(review)) => comment.min(review),
        (Some(comment), None) => comment,
        (None, Some(review)) => review,
        (None, None) => return None,
    };

    let start = ready_for_review_at.unwrap_or(item.created_at);
    Some(earliest - start)
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

    fn bot_comment(author: &str, d: u32) -> Comment {
        Comment {
            author_is_bot: true,
            ..comment(author, d)
        }
    }

    fn review(author: &str, d: u32) -> Review {
        Review {
            author: author.to_string(),
            author_is_bot: false,
            submitted_at: Some(day(d)),
        }
    }

    fn item(kind: ItemKind, comments: Vec<Comment>) -> Item {
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
            kind,
        }
    }

    #[test]
    fn no_comments_no_reviews_is_none() {
        let item = item(ItemKind::Issue, vec![]);
        assert_eq!(
            measure_time_to_first_response(&item, None, &[], 50),
            None
        );
    }

    #[test]
    fn earliest_of_comment_and_review_wins() {
        // Review at day 2 (T+1d), comment at day 3 (T+2d) => 1 day.
        let pull = PullContext {
            reviews: vec![review("carol", 2)],
            ..Default::default()
        };
        let item = item(ItemKind::PullRequest(pull), vec![comment("bob", 3)]);
        assert_eq!(
            measure_time_to_first_response(&item, None, &[], 50),
            Some(Duration::days(1))
        );
    }

    #[test]
    fn author_bot_and_ignored_comments_do_not_qualify() {
        let item = item(
            ItemKind::Issue,
            vec![
                comment("alice", 2),
                bot_comment("ci-bot", 3),
                comment("spammer", 4),
                comment("bob", 5),
            ],
        );
        let ignore = vec!["spammer".to_string()];
        assert_eq!(
            measure_time_to_first_response(&item, None, &ignore, 50),
            Some(Duration::days(4))
        );
    }

    #[test]
    fn comments_before_ready_for_review_are_excluded() {
        let item = item(ItemKind::Issue, vec![comment("bob", 2), comment("bob", 6)]);
        assert_eq!(
            measure_time_to_first_response(&item, Some(day(4)), &[], 50),
            Some(Duration::days(2))
        );
    }

    #[test]
    fn scan_limit_bounds_the_window() {
        let item = item(ItemKind::Issue, vec![bot_comment("ci-bot", 2), comment("bob", 3)]);
        assert_eq!(measure_time_to_first_response(&item, None, &[], 1), None);
        assert_eq!(
            measure_time_to_first_response(&item, None, &[], 2),
            Some(Duration::days(2))
        );
    }

    #[test]
    fn pending_reviews_are_skipped() {
        let pull = PullContext {
            reviews: vec![Review {
                author: "carol".to_string(),
                author_is_bot: false,
                submitted_at: None,
            }],
            ..Default::default()
        };
        let item = item(ItemKind::PullRequest(pull), vec![]);
        assert_eq!(measure_time_to_first_response(&item, None, &[], 50), None);
    }

    #[test]
    fn discussion_first_comment_counts() {
        let item = item(
            ItemKind::Discussion {
                answer_chosen_at: None,
            },
            vec![comment("dana", 4)],
        );
        assert_eq!(
            measure_time_to_first_response(&item, None, &[], 50),
            Some(Duration::days(3))
        );
    }
}
