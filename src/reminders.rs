//! Background reminder service.
//!
//! A timer task owns the [`ReminderSchedule`], sleeps until the next reminder
//! is due and sends a [`ReminderEvent`] over a channel. The foreground loop
//! receives events and hands them to the notifiers until shutdown.

use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use waterbuddy_core::reminder::{REMINDER_MESSAGE, REMINDER_TITLE};
use waterbuddy_core::{dispatch, Notifier, ReminderSchedule};

/// A reminder that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    pub sequence: u64,
    pub due_at: DateTime<Utc>,
}

pub struct ReminderService {
    schedule: ReminderSchedule,
    started_wall: DateTime<Utc>,
    started: Instant,
}

impl ReminderService {
    /// `started_at` must be the time the schedule was created with.
    pub fn new(schedule: ReminderSchedule, started_at: DateTime<Utc>) -> Self {
        Self {
            schedule,
            started_wall: started_at,
            started: Instant::now(),
        }
    }

    /// Wall time derived from the runtime's monotonic clock.
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.started_wall + elapsed
    }

    /// Spawns the timer task. It stops once the receiver is dropped.
    pub fn spawn(mut self) -> (mpsc::Receiver<ReminderEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move {
            let mut sequence = 0;
            loop {
                let wait = self
                    .schedule
                    .time_until_due(self.now())
                    .to_std()
                    .unwrap_or_default();
                tokio::time::sleep(wait).await;

                let now = self.now();
                let due_at = self.schedule.next_due();
                if !self.schedule.poll(now) {
                    continue;
                }

                sequence += 1;
                tracing::debug!(sequence, %due_at, "Reminder due");
                if tx.send(ReminderEvent { sequence, due_at }).await.is_err() {
                    break;
                }
            }
        });

        (rx, handle)
    }
}

/// Delivers reminders until `shutdown` resolves. Returns how many reminders
/// fired.
pub async fn run_until(
    service: ReminderService,
    notifiers: Vec<Box<dyn Notifier>>,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    let (mut events, handle) = service.spawn();
    tokio::pin!(shutdown);

    let mut fired = 0;
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                fired = event.sequence;
                let delivered = dispatch(&notifiers, REMINDER_TITLE, REMINDER_MESSAGE);
                if delivered == 0 {
                    tracing::warn!("Reminder {} could not be delivered", event.sequence);
                }
            }
            _ = &mut shutdown => break,
        }
    }

    handle.abort();
    fired
}
