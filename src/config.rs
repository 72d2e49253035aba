//! Application configuration and environment variable parsing.
//!
//! Configuration is loaded once from the environment (optionally via a .env
//! file) into `AppConfig` and passed by reference everywhere it is needed;
//! the metric functions themselves never read the environment.

use serde::{Deserialize, Deserializer};

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub search query selecting the issues/PRs/discussions to measure.
    /// Must name at least one owner (repo:, org:, user: or owner:).
    pub search_query: String,

    /// Optional GitHub Personal Access Token for higher rate limits.
    #[serde(default)]
    pub github_token: Option<String>,

    /// Labels to measure time spent in, comma-separated.
    #[serde(default, deserialize_with = "deserialize_comma_list")]
    pub labels_to_measure: Vec<String>,

    /// Usernames whose comments and reviews never qualify.
    #[serde(default, deserialize_with = "deserialize_comma_list")]
    pub ignore_users: Vec<String>,

    /// Compute the active-mentor count.
    #[serde(default)]
    pub enable_mentor_count: bool,

    /// Minimum summed comment count for a user to count as an active mentor.
    #[serde(default = "default_min_mentor_comments")]
    pub min_mentor_comments: u32,

    /// Maximum comments/reviews per item evaluated by the mentor tally.
    #[serde(default = "default_max_comments_to_eval")]
    pub max_comments_to_eval: usize,

    /// Per-item ceiling on one participant's counted comments.
    #[serde(default = "default_heavily_involved_cutoff")]
    pub heavily_involved_cutoff: u32,

    /// Look-ahead window for the first-response scan (comments and reviews).
    #[serde(default = "default_first_response_scan_limit")]
    pub first_response_scan_limit: usize,

    /// Track cumulative PR time in draft state.
    #[serde(default)]
    pub draft_pr_tracking: bool,

    /// Hard limit on paginated search requests to the GitHub API.
    #[serde(default = "default_max_api_pages")]
    pub max_api_pages: u32,

    /// Skip the rate-limit wait, for GHE servers with rate limiting off.
    #[serde(default)]
    pub rate_limit_bypass: bool,

    // Report shaping.
    #[serde(default)]
    pub hide_assignee: bool,
    #[serde(default)]
    pub hide_author: bool,
    #[serde(default)]
    pub hide_time_to_first_response: bool,
    #[serde(default)]
    pub hide_time_to_close: bool,
    #[serde(default)]
    pub hide_time_to_answer: bool,
    #[serde(default)]
    pub hide_label_metrics: bool,
    #[serde(default)]
    pub hide_created_at: bool,
    #[serde(default)]
    pub hide_status: bool,
    #[serde(default)]
    pub hide_items_closed_count: bool,

    /// Rewrite item links so they do not notify the target repository.
    #[serde(default)]
    pub non_mentioning_links: bool,

    #[serde(default = "default_report_title")]
    pub report_title: String,

    /// Markdown output path; the JSON report lands next to it with a .json
    /// extension.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

fn default_min_mentor_comments() -> u32 {
    10
}

fn default_max_comments_to_eval() -> usize {
    20
}

fn default_heavily_involved_cutoff() -> u32 {
    3
}

fn default_first_response_scan_limit() -> usize {
    50
}

fn default_max_api_pages() -> u32 {
    10
}

fn default_report_title() -> String {
    "Issue Metrics".to_string()
}

fn default_output_file() -> String {
    "issue_metrics.md".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// JSON report path derived from the Markdown path.
    pub fn json_output_file(&self) -> String {
        match self.output_file.strip_suffix(".md") {
            Some(stem) => format!("{stem}.json"),
            None => format!("{}.json", self.output_file),
        }
    }
}

fn deserialize_comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(parse_comma_list(&s))
}

fn parse_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
