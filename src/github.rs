//! GitHub fetch layer.
//!
//! Everything network-facing lives here: the issue/PR search, the per-item
//! event, comment, and review fetches, the GraphQL discussion search, and
//! the rate-limit wait. The rest of the crate only ever sees normalized
//! [`Item`] values.

use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use octocrab::models::issues::Issue as GhIssue;
use octocrab::models::IssueState;
use octocrab::{Octocrab, Page};
use serde::Deserialize;

use crate::item::{
    Comment, DraftEvent, DraftEventKind, Item, ItemKind, LabelEvent, LabelEventKind, PullContext,
    Review,
};

const PER_PAGE: u8 = 100;
/// Concurrent per-item detail fetches.
const DETAIL_CONCURRENCY: usize = 10;
/// Remaining core quota below which we wait for the API to refresh.
const LOW_QUOTA: usize = 5;
const QUOTA_SLEEP_SECS: u64 = 70;
const QUOTA_MAX_RETRIES: u32 = 5;

pub struct GitHubClient {
    octocrab: Octocrab,
    rate_limit_bypass: bool,
}

impl GitHubClient {
    pub fn new(token: Option<String>, rate_limit_bypass: bool) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        Ok(Self {
            octocrab: builder.build().context("failed to build GitHub client")?,
            rate_limit_bypass,
        })
    }

    /// Search for matching items and fetch everything the metrics need.
    ///
    /// Queries containing `type:discussions` go through the GraphQL search;
    /// everything else through the REST issue search.
    pub async fn fetch_items(&self, search_query: &str, max_pages: u32) -> Result<Vec<Item>> {
        if search_query.contains("type:discussions") {
            self.search_discussions(search_query).await
        } else {
            self.search_issues(search_query, max_pages).await
        }
    }

    /// Wait for the core quota to refresh when it runs low: sleep 70s and
    /// re-check, doubling the sleep, up to a bounded retry count.
    async fn wait_for_quota(&self) -> Result<()> {
        if self.rate_limit_bypass {
            return Ok(());
        }

        let mut sleep_secs = QUOTA_SLEEP_SECS;
        let mut retries = 0;
        loop {
            let limits = self
                .octocrab
                .ratelimit()
                .get()
                .await
                .context("failed to query the GitHub rate limit")?;
            if limits.resources.core.remaining >= LOW_QUOTA {
                return Ok(());
            }
            if retries >= QUOTA_MAX_RETRIES {
                bail!("exceeded maximum retries waiting for the GitHub API rate limit");
            }
            tracing::warn!(
                remaining = limits.resources.core.remaining,
                sleep_secs,
                "GitHub API rate limit low, waiting for refresh"
            );
            tokio::time::sleep(StdDuration::from_secs(sleep_secs)).await;
            sleep_secs *= 2;
            retries += 1;
        }
    }

    async fn search_issues(&self, search_query: &str, max_pages: u32) -> Result<Vec<Item>> {
        tracing::info!(search_query, "Searching for issues and pull requests");
        self.wait_for_quota().await?;

        let mut found: Vec<GhIssue> = Vec::new();
        let mut current_page = self
            .octocrab
            .search()
            .issues_and_pull_requests(search_query)
            .per_page(PER_PAGE)
            .send()
            .await
            .context(
                "GitHub search failed; check your token, permissions, and the search query",
            )?;
        let mut page_count = 1;

        loop {
            found.extend(current_page.items.drain(..));
            if page_count >= max_pages {
                tracing::warn!(
                    max_pages,
                    "Hit the search page limit before exhausting results; data may be incomplete"
                );
                break;
            }
            self.wait_for_quota().await?;
            match self.octocrab.get_page(&current_page.next).await? {
                Some(next_page) => {
                    current_page = next_page;
                    page_count += 1;
                }
                None => break,
            }
        }

        tracing::info!(count = found.len(), "Search finished, fetching item details");

        stream::iter(found)
            .map(|issue| self.load_item(issue))
            .buffered(DETAIL_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Turn one search hit into a fully-populated [`Item`].
    async fn load_item(&self, issue: GhIssue) -> Result<Item> {
        let (owner, repo) = parse_repository_url(issue.repository_url.as_str())
            .with_context(|| format!("unparseable repository url for {}", issue.html_url))?;
        let number = issue.number;

        let events: Vec<RawIssueEvent> = self
            .get_paginated(format!(
                "/repos/{owner}/{repo}/issues/{number}/events?per_page=100"
            ))
            .await
            .with_context(|| format!("failed to fetch events for {owner}/{repo}#{number}"))?;

        let label_events = events
            .iter()
            .filter_map(|event| {
                let kind = match event.event.as_str() {
                    "labeled" => LabelEventKind::Applied,
                    "unlabeled" => LabelEventKind::Removed,
                    _ => return None,
                };
                event.label.as_ref().map(|label| LabelEvent {
                    kind,
                    label: label.name.clone(),
                    created_at: event.created_at,
                })
            })
            .collect();

        let draft_events: Vec<DraftEvent> = events
            .iter()
            .filter_map(|event| {
                let kind = match event.event.as_str() {
                    "convert_to_draft" | "converted_to_draft" => DraftEventKind::ConvertedToDraft,
                    "ready_for_review" => DraftEventKind::ReadyForReview,
                    _ => return None,
                };
                Some(DraftEvent {
                    kind,
                    created_at: event.created_at,
                })
            })
            .collect();

        let comments = self
            .fetch_comments(&owner, &repo, number)
            .await
            .with_context(|| format!("failed to fetch comments for {owner}/{repo}#{number}"))?;

        let kind = if issue.pull_request.is_some() {
            // A deleted ("ghost") author can make the PR lookup fail; fall
            // back to issue-only metrics for that item instead of aborting.
            match self.octocrab.pulls(&owner, &repo).get(number).await {
                Ok(pull) => {
                    let reviews = self
                        .fetch_reviews(&owner, &repo, number)
                        .await
                        .with_context(|| {
                            format!("failed to fetch reviews for {owner}/{repo}#{number}")
                        })?;
                    ItemKind::PullRequest(PullContext {
                        merged_at: pull.merged_at,
                        is_draft: pull.draft.unwrap_or(false),
                        draft_events,
                        reviews,
                    })
                }
                Err(error) => {
                    tracing::warn!(
                        url = %issue.html_url,
                        %error,
                        "Could not resolve pull request context, using issue-only metrics"
                    );
                    ItemKind::Issue
                }
            }
        } else {
            ItemKind::Issue
        };

        let status = match issue.state {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            _ => "unknown",
        };

        Ok(Item {
            title: issue.title,
            url: issue.html_url.to_string(),
            author: issue.user.login,
            assignees: issue
                .assignees
                .into_iter()
                .map(|assignee| assignee.login)
                .collect(),
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            status: Some(status.to_string()),
            comments,
            label_events,
            kind,
        })
    }

    async fn fetch_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        let mut page = self
            .octocrab
            .issues(owner, repo)
            .list_comments(number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        loop {
            comments.extend(page.items.drain(..).map(|comment| Comment {
                author_is_bot: comment.user.r#type == "Bot",
                author: comment.user.login,
                created_at: comment.created_at,
            }));
            match self.octocrab.get_page(&page.next).await? {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(comments)
    }

    async fn fetch_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Review>> {
        let raw: Vec<RawReview> = self
            .get_paginated(format!(
                "/repos/{owner}/{repo}/pulls/{number}/reviews?per_page=100"
            ))
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|review| {
                review.user.map(|user| Review {
                    author_is_bot: user.kind == "Bot",
                    author: user.login,
                    submitted_at: review.submitted_at,
                })
            })
            .collect())
    }

    /// Collect every page of a list endpoint into one vector.
    async fn get_paginated<T>(&self, route: String) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page: Page<T> = self.octocrab.get(&route, None::<&()>).await?;
        loop {
            items.append(&mut page.items);
            match self.octocrab.get_page(&page.next).await? {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(items)
    }

    async fn search_discussions(&self, search_query: &str) -> Result<Vec<Item>> {
        tracing::info!(search_query, "Searching for discussions");

        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = serde_json::json!({
                "query": DISCUSSION_SEARCH_QUERY,
                "variables": { "searchQuery": search_query, "after": cursor },
            });
            let response: serde_json::Value = self
                .octocrab
                .graphql(&payload)
                .await
                .context("GitHub GraphQL discussion search failed")?;

            if let Some(errors) = response.get("errors") {
                if !errors.is_null() {
                    bail!("GraphQL discussion search returned errors: {errors}");
                }
            }

            let search: DiscussionSearch =
                serde_json::from_value(response["data"]["search"].clone())
                    .context("unexpected GraphQL discussion search response shape")?;

            for node in search.nodes {
                items.push(discussion_to_item(node));
            }

            if search.page_info.has_next_page {
                cursor = search.page_info.end_cursor;
            } else {
                break;
            }
        }

        Ok(items)
    }
}

/// Extract the owners named in a search query (`repo:`, `org:`, `user:`,
/// `owner:`). The query must name at least one for a run to make sense.
pub fn get_owners(search_query: &str) -> Vec<String> {
    search_query
        .split_whitespace()
        .filter_map(|term| {
            let (qualifier, value) = term.split_once(':')?;
            match qualifier {
                "repo" => value.split('/').next().map(str::to_string),
                "org" | "owner" | "user" => Some(value.to_string()),
                _ => None,
            }
        })
        .collect()
}

fn parse_repository_url(url: &str) -> Option<(String, String)> {
    // e.g. https://api.github.com/repos/owner/repo
    let mut segments = url.split('/').rev();
    let repo = segments.next()?.to_string();
    let owner = segments.next()?.to_string();
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner, repo))
}

#[derive(Debug, Deserialize)]
struct RawIssueEvent {
    event: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    label: Option<RawLabel>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    #[serde(rename = "type", default)]
    kind: String,
}

const DISCUSSION_SEARCH_QUERY: &str = r#"
query($searchQuery: String!, $after: String) {
    search(query: $searchQuery, type: DISCUSSION, first: 100, after: $after) {
        pageInfo {
            hasNextPage
            endCursor
        }
        nodes {
            ... on Discussion {
                title
                url
                createdAt
                closedAt
                answerChosenAt
                author {
                    login
                    __typename
                }
                comments(first: 100) {
                    nodes {
                        createdAt
                        author {
                            login
                            __typename
                        }
                    }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionSearch {
    page_info: PageInfo,
    nodes: Vec<DiscussionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionNode {
    title: String,
    url: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    answer_chosen_at: Option<DateTime<Utc>>,
    author: Option<Actor>,
    comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
struct CommentConnection {
    nodes: Vec<DiscussionComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionComment {
    created_at: DateTime<Utc>,
    author: Option<Actor>,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
    #[serde(rename = "__typename", default)]
    typename: String,
}

fn discussion_to_item(node: DiscussionNode) -> Item {
    let status = if node.closed_at.is_some() {
        "closed"
    } else {
        "open"
    };
    Item {
        title: node.title,
        url: node.url,
        author: node
            .author
            .as_ref()
            .map(|actor| actor.login.clone())
            .unwrap_or_else(|| "ghost".to_string()),
        assignees: vec![],
        created_at: node.created_at,
        closed_at: node.closed_at,
        status: Some(status.to_string()),
        comments: node
            .comments
            .nodes
            .into_iter()
            .map(|comment| Comment {
                author_is_bot: comment
                    .author
                    .as_ref()
                    .is_some_and(|actor| actor.typename == "Bot"),
                author: comment
                    .author
                    .map(|actor| actor.login)
                    .unwrap_or_else(|| "ghost".to_string()),
                created_at: comment.created_at,
            })
            .collect(),
        label_events: vec![],
        kind: ItemKind::Discussion {
            answer_chosen_at: node.answer_chosen_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_come_from_repo_org_user_and_owner_terms() {
        assert_eq!(get_owners("is:issue repo:octocat/hello"), vec!["octocat"]);
        assert_eq!(get_owners("org:github is:open"), vec!["github"]);
        assert_eq!(get_owners("user:alice"), vec!["alice"]);
        assert_eq!(get_owners("owner:bob type:pr"), vec!["bob"]);
        assert!(get_owners("is:issue label:bug").is_empty());
    }

    #[test]
    fn repository_url_parses_owner_and_repo() {
        assert_eq!(
            parse_repository_url("https://api.github.com/repos/octocat/hello"),
            Some(("octocat".to_string(), "hello".to_string()))
        );
    }

    #[test]
    fn discussion_node_maps_to_item() {
        let node: DiscussionNode = serde_json::from_value(serde_json::json!({
            "title": "How do I?",
            "url": "https://github.com/o/r/discussions/7",
            "createdAt": "2021-01-01T00:00:00Z",
            "closedAt": null,
            "answerChosenAt": "2021-01-03T00:00:00Z",
            "author": { "login": "alice", "__typename": "User" },
            "comments": { "nodes": [
                { "createdAt": "2021-01-02T00:00:00Z",
                  "author": { "login": "helper-bot", "__typename": "Bot" } }
            ]}
        }))
        .unwrap();

        let item = discussion_to_item(node);
        assert_eq!(item.author, "alice");
        assert!(item.closed_at.is_none());
        assert!(item.comments[0].author_is_bot);
        assert!(matches!(
            item.kind,
            ItemKind::Discussion { answer_chosen_at: Some(_) }
        ));
    }
}
