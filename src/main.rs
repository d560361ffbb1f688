use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod notify;
mod reminders;
mod session;

use commands::{ConfigCommand, RemindCommand, UserCommand, WaterCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "waterbuddy")]
#[command(version)]
#[command(about = "Track your daily water intake", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, sign in and manage your profile
    User(UserCommand),

    /// Log water and view progress, history and badges
    Water(WaterCommand),

    /// Remind you to drink water at a fixed interval
    Remind(RemindCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waterbuddy=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    tracing::debug!(data_dir = %config.data_dir.value.display(), "Configuration loaded");

    match cli.command {
        Some(Commands::User(cmd)) => cmd.run(&config)?,
        Some(Commands::Water(cmd)) => cmd.run(&config)?,
        Some(Commands::Remind(cmd)) => cmd.run(&config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
