use chrono::Utc;
use clap::Args;

use waterbuddy_core::reminder::{MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use waterbuddy_core::{Notifier, ReminderSchedule};

use super::{open_store, require_session};
use crate::config::Config;
use crate::notify::{DesktopNotifier, TerminalNotifier};
use crate::reminders::{run_until, ReminderService};

#[derive(Args)]
pub struct RemindCommand {
    /// Minutes between reminders (defaults to the configured interval)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(MIN_INTERVAL_MINUTES as i64..=MAX_INTERVAL_MINUTES as i64))]
    pub interval: Option<u32>,

    /// Also show desktop notifications
    #[arg(long)]
    pub desktop: bool,
}

impl RemindCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = require_session(config)?;
        let profile = open_store(config).profile(&session.identifier)?;

        let interval = self
            .interval
            .unwrap_or(config.reminder_interval_minutes.value);
        let started_at = Utc::now();
        let schedule = ReminderSchedule::new(interval, started_at)?;

        let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(TerminalNotifier)];
        if self.desktop || config.desktop_notifications.value {
            notifiers.push(Box::new(DesktopNotifier::new()));
        }

        println!(
            "Hi {}! Reminding you to drink water every {} minutes.",
            profile.name, interval
        );
        println!("Press Ctrl-C to stop.");
        tracing::info!(interval, notifiers = notifiers.len(), "Reminders started");

        let fired = run_until(
            ReminderService::new(schedule, started_at),
            notifiers,
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                }
            },
        )
        .await;

        println!("\nStopped after {} reminder(s).", fired);
        Ok(())
    }
}
