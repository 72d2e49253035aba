//! Normalized in-memory representation of the things we measure.
//!
//! The fetch layer flattens GitHub's issue/PR/discussion shapes into [`Item`]
//! so the metric functions never touch API types. Issues and pull requests
//! share the same record; a pull request additionally carries a
//! [`PullContext`], and a discussion is the restricted variant with no
//! labels, drafts, or reviews.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

/// A comment on an issue, pull request, or discussion thread.
#[derive(Debug, Clone)]
pub struct Comment {
    pub author: String,
    pub author_is_bot: bool,
    pub created_at: DateTime<Utc>,
}

/// A pull request review. Pending reviews have no `submitted_at` and are
/// skipped by the response/mentor scans.
#[derive(Debug, Clone)]
pub struct Review {
    pub author: String,
    pub author_is_bot: bool,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelEventKind {
    Applied,
    Removed,
}

/// A labeled/unlabeled event from the issue's event stream.
#[derive(Debug, Clone)]
pub struct LabelEvent {
    pub kind: LabelEventKind,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEventKind {
    ConvertedToDraft,
    ReadyForReview,
}

/// A draft-state transition from the issue's event stream.
#[derive(Debug, Clone)]
pub struct DraftEvent {
    pub kind: DraftEventKind,
    pub created_at: DateTime<Utc>,
}

/// Pull-request-only context attached to an [`Item`].
#[derive(Debug, Clone, Default)]
pub struct PullContext {
    pub merged_at: Option<DateTime<Utc>>,
    /// Whether the PR is in draft state at fetch time.
    pub is_draft: bool,
    pub draft_events: Vec<DraftEvent>,
    pub reviews: Vec<Review>,
}

/// What the item is, with the variant-specific data.
#[derive(Debug, Clone)]
pub enum ItemKind {
    Issue,
    PullRequest(PullContext),
    Discussion {
        answer_chosen_at: Option<DateTime<Utc>>,
    },
}

/// One issue, pull request, or discussion under analysis.
///
/// `closed_at` is present iff the item is closed; `created_at` is always
/// present. Event and comment lists are materialized (multiple passes are
/// fine) and chronological as returned by the API.
#[derive(Debug, Clone)]
pub struct Item {
    pub title: String,
    pub url: String,
    pub author: String,
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Display status, e.g. "open" or "closed".
    pub status: Option<String>,
    pub comments: Vec<Comment>,
    /// Empty for discussions.
    pub label_events: Vec<LabelEvent>,
    pub kind: ItemKind,
}

impl Item {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Pull-request context, if this item is a pull request.
    pub fn pull(&self) -> Option<&PullContext> {
        match &self.kind {
            ItemKind::PullRequest(pull) => Some(pull),
            _ => None,
        }
    }
}

/// Per-item metric record. Populated field by field by the extractors and
/// never revised afterwards; `None` always means "no data", never zero.
#[derive(Debug, Clone)]
pub struct ItemMetrics {
    pub title: String,
    pub url: String,
    pub author: String,
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: Option<String>,
    pub time_to_first_response: Option<Duration>,
    pub time_to_close: Option<Duration>,
    pub time_to_answer: Option<Duration>,
    pub time_in_draft: Option<Duration>,
    /// Label name -> duration, `None` per label that saw no events.
    /// `None` overall when label measurement was not requested.
    pub label_durations: Option<BTreeMap<String, Option<Duration>>>,
    /// Participant login -> capped qualifying-comment count.
    pub mentor_activity: Option<HashMap<String, u32>>,
    /// Comment + review count for pull requests, `None` for anything else.
    pub pr_comment_count: Option<usize>,
}

impl ItemMetrics {
    /// A record carrying the item's identity with every metric unset.
    pub fn new(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            author: item.author.clone(),
            assignees: item.assignees.clone(),
            created_at: item.created_at,
            status: item.status.clone(),
            time_to_first_response: None,
            time_to_close: None,
            time_to_answer: None,
            time_in_draft: None,
            label_durations: None,
            mentor_activity: None,
            pr_comment_count: None,
        }
    }
}
