//! Reminder scheduling.
//!
//! A reminder is due once the wall clock passes `next_due`. Nothing here
//! sleeps or spawns; front ends decide how to wait and call [`ReminderSchedule::poll`].

use chrono::{DateTime, Duration, Utc};

/// Shortest allowed reminder interval.
pub const MIN_INTERVAL_MINUTES: u32 = 5;
/// Longest allowed reminder interval.
pub const MAX_INTERVAL_MINUTES: u32 = 120;
/// Interval used when none is configured.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

pub const REMINDER_TITLE: &str = "Water Buddy Reminder 💧";
pub const REMINDER_MESSAGE: &str = "Time to take a sip of water and stay hydrated!";

/// True once `now` has reached `next_due`.
pub fn is_due(now: DateTime<Utc>, next_due: DateTime<Utc>) -> bool {
    now >= next_due
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReminderError {
    #[error("Reminder interval must be between 5 and 120 minutes, got {0}")]
    IntervalOutOfRange(u32),
}

/// Interval and next due time for one session's reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule {
    interval_minutes: u32,
    next_due: DateTime<Utc>,
}

impl ReminderSchedule {
    /// Starts a schedule whose first reminder is one interval after `now`.
    pub fn new(interval_minutes: u32, now: DateTime<Utc>) -> Result<Self, ReminderError> {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
            return Err(ReminderError::IntervalOutOfRange(interval_minutes));
        }
        Ok(Self {
            interval_minutes,
            next_due: now + Self::minutes(interval_minutes),
        })
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn interval(&self) -> Duration {
        Self::minutes(self.interval_minutes)
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// Returns true if a reminder is due and, if so, schedules the next one
    /// a full interval after `now`. Missed reminders are not replayed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if !is_due(now, self.next_due) {
            return false;
        }
        self.next_due = now + self.interval();
        true
    }

    /// Time left until the next reminder, zero if already due.
    pub fn time_until_due(&self, now: DateTime<Utc>) -> Duration {
        (self.next_due - now).max(Duration::zero())
    }

    fn minutes(minutes: u32) -> Duration {
        Duration::minutes(i64::from(minutes))
    }
}

/// Errors a notifier may report. Always best-effort.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notifications unavailable: {0}")]
    NotificationUnavailable(String),
}

/// Something that can show a reminder to the user.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Sends a reminder through every notifier. Failures are logged and
/// swallowed; returns how many notifiers succeeded.
pub fn dispatch(notifiers: &[Box<dyn Notifier>], title: &str, message: &str) -> usize {
    notifiers
        .iter()
        .filter(|notifier| match notifier.notify(title, message) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(notifier = notifier.name(), "Reminder not delivered: {}", e);
                false
            }
        })
        .count()
}
