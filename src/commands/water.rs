use clap::{Args, Subcommand};
use serde::Serialize;

use waterbuddy_core::{DailyTotal, FileBackend, HydrationStore, Progress};

use super::{open_store, require_session, OutputFormat};
use crate::config::Config;

/// Width of the history bar that represents 100% of the goal.
const BAR_WIDTH: usize = 20;
/// Bars are cut off past this many cells.
const BAR_MAX: usize = 30;

#[derive(Args)]
pub struct WaterCommand {
    #[command(subcommand)]
    pub command: WaterSubcommand,
}

#[derive(Subcommand)]
pub enum WaterSubcommand {
    /// Log water you drank
    Log {
        /// Amount in ml
        #[arg(default_value_t = 250, value_parser = clap::value_parser!(u32).range(1..=5000))]
        amount: u32,
    },

    /// Show today's progress
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show daily totals for recent days
    History {
        /// Number of days, ending today
        #[arg(long, short, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List earned badges
    Badges,
}

#[derive(Serialize)]
struct StatusView {
    #[serde(flatten)]
    progress: Progress,
    badges: Vec<String>,
}

impl WaterCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = require_session(config)?;
        let store = open_store(config);
        let user = session.identifier.as_str();

        match &self.command {
            WaterSubcommand::Log { amount } => {
                store.log_intake(user, *amount)?;
                let progress = store.today_progress(user)?;

                println!("Logged {} ml.", amount);
                print_progress(&progress);
                announce_new_badges(&store, user)?;
                Ok(())
            }

            WaterSubcommand::Status { format } => {
                let progress = store.today_progress(user)?;
                let earned = store.check_achievements(user)?;

                match format {
                    OutputFormat::Json => {
                        let view = StatusView {
                            progress,
                            badges: store.badges(user)?,
                        };
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        print_progress(&progress);
                        for badge in earned {
                            println!("You earned the {}! Keep up the streak!", badge);
                        }
                    }
                }
                Ok(())
            }

            WaterSubcommand::History { days, format } => {
                let history = store.history(user, *days)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&history)?);
                    }
                    OutputFormat::Text => {
                        let goal = store.profile(user)?.daily_goal;
                        println!("Water intake - last {} day(s)", days);
                        println!("{}", "-".repeat(44));
                        for day in &history {
                            println!("{}", history_line(day, goal));
                        }
                        println!("{}", "-".repeat(44));
                        println!("Goal: {} ml/day", goal);
                    }
                }
                Ok(())
            }

            WaterSubcommand::Badges => {
                let badges = store.badges(user)?;
                if badges.is_empty() {
                    println!("No badges yet. Keep going!");
                } else {
                    for badge in &badges {
                        println!("  {}", badge);
                    }
                    println!("\nTotal: {} badge(s)", badges.len());
                }
                Ok(())
            }
        }
    }
}

fn announce_new_badges(
    store: &HydrationStore<FileBackend>,
    user: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    for badge in store.check_achievements(user)? {
        println!("You earned the {}! Keep up the streak!", badge);
    }
    Ok(())
}

fn print_progress(progress: &Progress) {
    println!(
        "Today's Progress: {}% {}",
        progress.percent,
        progress.mood.emoji()
    );
    println!("  {}", progress_bar(progress.percent));
    println!(
        "Total water logged today: {} ml / {} ml",
        progress.total_ml, progress.goal_ml
    );
    if !progress.goal_reached() {
        println!("  {} ml to go", progress.remaining_ml());
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

fn history_line(day: &DailyTotal, goal_ml: u32) -> String {
    let cells = if goal_ml == 0 {
        0
    } else {
        let scaled = u64::from(day.total_ml) * BAR_WIDTH as u64 / u64::from(goal_ml);
        (scaled as usize).min(BAR_MAX)
    };
    let marker = if goal_ml > 0 && day.total_ml >= goal_ml {
        " *"
    } else {
        ""
    };

    format!(
        "{}  {:<width$} {:>5} ml{}",
        day.date.format("%a %b %d"),
        "#".repeat(cells),
        day.total_ml,
        marker,
        width = BAR_MAX
    )
}
