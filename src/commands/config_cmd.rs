use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::Config;

const DEFAULT_CONFIG: &str = r#"# waterbuddy configuration

# Directory for users.json, logs.json and badges.json
# (default: ~/.local/share/waterbuddy)
# data_dir: ~/.local/share/waterbuddy

# Minutes between reminders (5 to 120)
reminder_interval_minutes: 30

# Also show reminders as desktop notifications (needs notify-send)
desktop_notifications: false
"#;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    /// `config_path` is the `--config` override, if one was given.
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!(
                            "reminder_interval_minutes: {}",
                            config.reminder_interval_minutes.value
                        );
                        println!("  source: {}", config.reminder_interval_minutes.source);
                        println!();

                        println!(
                            "desktop_notifications: {}",
                            config.desktop_notifications.value
                        );
                        println!("  source: {}", config.desktop_notifications.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let path = config_path.unwrap_or_else(Config::default_config_path);
                if write_default_config(&path)? {
                    println!("Created config file: {}", path.display());
                    println!("\nEdit this file to customize your settings.");
                } else {
                    println!("Config file already exists: {}", path.display());
                    println!("Use 'waterbuddy config show' to view current configuration.");
                }
                Ok(())
            }
        }
    }
}

/// Writes the default config to `path`. Returns false if a file is already there.
fn write_default_config(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(DEFAULT_CONFIG.as_bytes())?;
    Ok(true)
}
