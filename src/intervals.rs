//! Interval reconstruction over boolean state-change events.
//!
//! Label presence and draft mode are both "entered state / left state" event
//! streams; this module rebuilds how long the state held true from those
//! events. It keeps explicit interval start/end bookkeeping rather than the
//! signed add/subtract trick, so open intervals and boundary clipping stay
//! well defined.

use chrono::{DateTime, Duration, Utc};

/// One transition of a boolean state at a point in time.
#[derive(Debug, Clone, Copy)]
pub struct StateChange {
    pub entered: bool,
    pub at: DateTime<Utc>,
}

/// Result of folding a state-change stream.
#[derive(Debug, Clone, Copy)]
pub struct StateIntervals {
    /// Sum of all closed apply->remove intervals.
    pub closed_total: Duration,
    /// Whether any event survived closure filtering. Distinguishes "state
    /// never referenced" from "referenced but zero time".
    pub referenced: bool,
    /// Start of a still-open interval, if the state was active after the
    /// last event.
    pub open_since: Option<DateTime<Utc>>,
}

/// Fold chronological state changes into closed intervals plus an open tail.
///
/// Events at or after `closed_at` are treated as not having happened: they
/// contribute nothing and do not flip the state. An "entered" change while
/// already in the state is ignored, as is a "left" change with no open
/// interval (that one still marks the state as referenced).
pub fn fold_state_changes(
    changes: &[StateChange],
    closed_at: Option<DateTime<Utc>>,
) -> StateIntervals {
    let mut closed_total = Duration::zero();
    let mut referenced = false;
    let mut open_since: Option<DateTime<Utc>> = None;

    for change in changes {
        if let Some(closed) = closed_at {
            if change.at >= closed {
                continue;
            }
        }
        referenced = true;

        match (change.entered, open_since) {
            (true, None) => open_since = Some(change.at),
            (false, Some(start)) => {
                closed_total = closed_total + (change.at - start);
                open_since = None;
            }
            // Duplicate enter, or leave with nothing open.
            (true, Some(_)) | (false, None) => {}
        }
    }

    StateIntervals {
        closed_total,
        referenced,
        open_since,
    }
}

impl StateIntervals {
    /// Total time in state, resolving a still-open interval at the item's
    /// closure timestamp if closed, or at `now` if still open.
    ///
    /// Returns `None` when no event referenced the state at all.
    pub fn resolve_clipped(
        &self,
        closed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        if !self.referenced {
            return None;
        }
        let mut total = self.closed_total;
        if let Some(start) = self.open_since {
            let end = closed_at.unwrap_or(now);
            total = total + (end - start);
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, day, hour, 0, 0).unwrap()
    }

    fn enter(day: u32) -> StateChange {
        StateChange {
            entered: true,
            at: at(day, 0),
        }
    }

    fn leave(day: u32) -> StateChange {
        StateChange {
            entered: false,
            at: at(day, 0),
        }
    }

    #[test]
    fn no_events_is_unreferenced() {
        let folded = fold_state_changes(&[], None);
        assert!(!folded.referenced);
        assert_eq!(folded.resolve_clipped(None, at(10, 0)), None);
    }

    #[test]
    fn single_closed_interval() {
        let folded = fold_state_changes(&[enter(1), leave(3)], None);
        assert_eq!(folded.closed_total, Duration::days(2));
        assert!(folded.open_since.is_none());
    }

    #[test]
    fn disjoint_cycles_are_additive() {
        let folded = fold_state_changes(&[enter(1), leave(2), enter(5), leave(8)], None);
        assert_eq!(
            folded.resolve_clipped(None, at(20, 0)),
            Some(Duration::days(4))
        );
    }

    #[test]
    fn open_tail_clips_to_closure() {
        let folded = fold_state_changes(&[enter(1)], Some(at(5, 0)));
        assert_eq!(
            folded.resolve_clipped(Some(at(5, 0)), at(20, 0)),
            Some(Duration::days(4))
        );
    }

    #[test]
    fn open_tail_measures_to_now_when_open() {
        let folded = fold_state_changes(&[enter(1)], None);
        assert_eq!(
            folded.resolve_clipped(None, at(4, 0)),
            Some(Duration::days(3))
        );
    }

    #[test]
    fn events_at_or_after_closure_are_dropped() {
        let closed = Some(at(5, 0));
        let folded = fold_state_changes(&[enter(20)], closed);
        assert!(!folded.referenced);
        assert_eq!(folded.resolve_clipped(closed, at(30, 0)), None);

        // Exactly at closure is also dropped.
        let folded = fold_state_changes(&[enter(5)], closed);
        assert!(!folded.referenced);
    }

    #[test]
    fn leave_without_enter_is_zero_but_referenced() {
        let folded = fold_state_changes(&[leave(3)], None);
        assert!(folded.referenced);
        assert_eq!(
            folded.resolve_clipped(None, at(10, 0)),
            Some(Duration::zero())
        );
    }

    #[test]
    fn duplicate_enter_keeps_first_start() {
        let folded = fold_state_changes(&[enter(1), enter(2), leave(4)], None);
        assert_eq!(folded.closed_total, Duration::days(3));
    }

    #[test]
    fn removal_after_closure_leaves_interval_open_to_closure() {
        let closed = Some(at(3, 0));
        let folded = fold_state_changes(&[enter(1), leave(10)], closed);
        assert_eq!(
            folded.resolve_clipped(closed, at(30, 0)),
            Some(Duration::days(2))
        );
    }
}
