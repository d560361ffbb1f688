use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use waterbuddy_core::{HealthCondition, NewUser, UserProfile};

use super::{open_store, read_password, require_session, OutputFormat};
use crate::config::Config;
use crate::session::SessionFile;

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Create an account
    Signup {
        /// Email address (your login)
        email: String,

        /// Display name
        #[arg(long, short)]
        name: String,

        /// Age in years
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..=120))]
        age: u32,

        /// Profession
        #[arg(long)]
        profession: Option<String>,

        /// Health condition affecting hydration (heart, diabetes, kidney); can be repeated
        #[arg(long = "condition", value_name = "CONDITION")]
        conditions: Vec<HealthCondition>,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in
    Signin {
        /// Email address
        email: String,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out
    Signout,

    /// Show your profile
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change your daily goal
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// Set a custom daily goal in ml
    Set {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=20000))]
        goal_ml: u32,
    },

    /// Recompute the goal from your age and health conditions
    Recalc,
}

/// Profile as shown to the user; never includes the password hash.
#[derive(Serialize)]
struct ProfileView<'a> {
    email: &'a str,
    name: &'a str,
    age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    profession: Option<&'a str>,
    health_conditions: Vec<&'static str>,
    daily_goal: u32,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a UserProfile> for ProfileView<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            email: &profile.identifier,
            name: &profile.name,
            age: profile.age,
            profession: profile.profession.as_deref(),
            health_conditions: profile.conditions().iter().map(|c| c.label()).collect(),
            daily_goal: profile.daily_goal,
            created_at: profile.created_at,
        }
    }
}

impl UserCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let store = open_store(config);

        match &self.command {
            UserSubcommand::Signup {
                email,
                name,
                age,
                profession,
                conditions,
                password,
            } => {
                let password = read_password(password)?;
                let mut new_user =
                    NewUser::new(name, password, *age).with_conditions(conditions.clone());
                if let Some(p) = profession {
                    new_user = new_user.with_profession(p);
                }

                let goal = store.register(email, new_user)?;

                println!("Sign up successful! Please sign in.");
                println!("  Daily goal: {} ml", goal);
                Ok(())
            }

            UserSubcommand::Signin { email, password } => {
                let password = read_password(password)?;
                let session = store.authenticate(email, &password)?;
                SessionFile::new(&config.data_dir.value).save(&session)?;

                let profile = store.profile(email)?;
                println!("Welcome back, {}!", profile.name);
                Ok(())
            }

            UserSubcommand::Signout => {
                if SessionFile::new(&config.data_dir.value).clear()? {
                    println!("Signed out.");
                } else {
                    println!("Not signed in.");
                }
                Ok(())
            }

            UserSubcommand::Show { format } => {
                let session = require_session(config)?;
                let profile = store.profile(&session.identifier)?;

                match format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&ProfileView::from(&profile))?
                        );
                    }
                    OutputFormat::Text => {
                        println!("{}", profile);
                    }
                }
                Ok(())
            }

            UserSubcommand::Goal { action } => {
                let session = require_session(config)?;
                match action {
                    GoalAction::Set { goal_ml } => {
                        store.set_daily_goal(&session.identifier, *goal_ml)?;
                        println!("Daily goal set to {} ml", goal_ml);
                    }
                    GoalAction::Recalc => {
                        let goal = store.recalculate_goal(&session.identifier)?;
                        println!("Daily goal recalculated: {} ml", goal);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_profile_view_hides_password() {
        let profile = UserProfile {
            identifier: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            password: "argon2id$secret".to_string(),
            age: 30,
            profession: Some("Nurse".to_string()),
            health_conditions: UserProfile::condition_flags(&[HealthCondition::Heart]),
            daily_goal: 2240,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(ProfileView::from(&profile)).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["health_conditions"][0], "Heart Issue");
        assert_eq!(json["profession"], "Nurse");
    }
}
