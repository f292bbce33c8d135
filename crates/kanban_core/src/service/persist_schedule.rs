//! Debounce bookkeeping for board saves.
//!
//! The schedule is a plain "dirty + due_at" state machine; the owner polls
//! [`PersistSchedule::is_due`] from its event loop instead of spawning timers.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Default quiet period before a save.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistSchedule {
    delay: TimeDelta,
    due_at: Option<DateTime<Utc>>,
}

impl PersistSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: TimeDelta::from_std(delay).unwrap_or_else(|_| TimeDelta::zero()),
            due_at: None,
        }
    }

    /// Records a change at `now`, pushing the deadline out by the delay.
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        self.due_at = Some(now + self.delay);
    }

    pub fn is_dirty(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due_at| now >= due_at)
    }

    /// Drops the pending save, e.g. after a successful flush.
    pub fn clear(&mut self) {
        self.due_at = None;
    }
}

impl Default for PersistSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::PersistSchedule;
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::time::Duration;

    #[test]
    fn each_change_pushes_deadline_out() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut schedule = PersistSchedule::new(Duration::from_millis(500));
        assert!(!schedule.is_dirty());

        schedule.mark_dirty(start);
        schedule.mark_dirty(start + TimeDelta::milliseconds(400));

        assert!(!schedule.is_due(start + TimeDelta::milliseconds(800)));
        assert!(schedule.is_due(start + TimeDelta::milliseconds(900)));

        schedule.clear();
        assert!(!schedule.is_due(start + TimeDelta::seconds(10)));
    }
}
