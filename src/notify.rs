//! Reminder notifiers.

use std::io;
use std::process::{Command, Stdio};

use waterbuddy_core::{Notifier, NotifyError};

/// Prints reminders to the terminal.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn name(&self) -> &str {
        "terminal"
    }

    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        println!("[{}] {}: {}", chrono::Local::now().format("%H:%M"), title, message);
        Ok(())
    }
}

/// Shows desktop notifications through `notify-send`.
pub struct DesktopNotifier {
    program: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_program("notify-send")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .arg("--expire-time=5000")
            .arg(title)
            .arg(message)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => NotifyError::NotificationUnavailable(format!(
                    "'{}' is not installed",
                    self.program
                )),
                _ => NotifyError::NotificationUnavailable(e.to_string()),
            })?;

        if !status.success() {
            return Err(NotifyError::NotificationUnavailable(format!(
                "'{}' exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}
