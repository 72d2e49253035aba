//! Time for a discussion to get a chosen answer.

use chrono::Duration;

use crate::item::{Item, ItemKind};

/// Answer-chosen timestamp minus creation. `None` for unanswered
/// discussions and for anything that is not a discussion.
pub fn measure_time_to_answer(item: &Item) -> Option<Duration> {
    match item.kind {
        ItemKind::Discussion {
            answer_chosen_at: Some(answered),
        } => Some(answered - item.created_at),
        _ => None,
    }
}
