pub mod config;
pub mod duration_fmt;
pub mod github;
pub mod intervals;
pub mod item;
pub mod json_output;
pub mod labels;
pub mod markdown;
pub mod most_active_mentors;
pub mod pr_comments;
pub mod report;
pub mod stats;
pub mod time_in_draft;
pub mod time_to_answer;
pub mod time_to_close;
pub mod time_to_first_response;
