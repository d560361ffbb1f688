mod config_cmd;
mod remind;
mod user;
mod water;

pub use config_cmd::ConfigCommand;
pub use remind::RemindCommand;
pub use user::UserCommand;
pub use water::WaterCommand;

use clap::ValueEnum;
use std::io::{self, BufRead, Write};

use waterbuddy_core::{FileBackend, HydrationStore, Session};

use crate::config::Config;
use crate::session::SessionFile;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Opens the store over the configured data directory.
pub fn open_store(config: &Config) -> HydrationStore<FileBackend> {
    HydrationStore::new(FileBackend::new(config.data_dir.value.clone()))
}

/// Returns the signed-in session or an error telling the user to sign in.
fn require_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    SessionFile::new(&config.data_dir.value)
        .load()?
        .ok_or_else(|| "Not signed in. Run 'waterbuddy user signin <email>' first.".into())
}

/// Uses the password given on the command line, or reads one line from stdin.
fn read_password(provided: &Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(password) = provided {
        return Ok(password.clone());
    }

    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err("Password is required".into());
    }
    Ok(password)
}
