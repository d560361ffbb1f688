use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::health::HealthCondition;

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub age: u32,
    pub profession: Option<String>,
    pub conditions: Vec<HealthCondition>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, password: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            age,
            profession: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<HealthCondition>) -> Self {
        self.conditions = conditions;
        self
    }
}

/// A registered user as stored in `users.json`.
///
/// The identifier is the key of the enclosing map and is not repeated in
/// the stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip)]
    pub identifier: String,
    pub name: String,
    /// Password hash, never the password itself.
    pub password: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default)]
    pub health_conditions: BTreeMap<String, bool>,
    pub daily_goal: u32,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Conditions flagged `true`. Unknown labels are ignored.
    pub fn conditions(&self) -> Vec<HealthCondition> {
        self.health_conditions
            .iter()
            .filter(|(_, active)| **active)
            .filter_map(|(label, _)| HealthCondition::from_label(label))
            .collect()
    }

    /// Builds the persisted condition map, listing every known condition.
    pub fn condition_flags(conditions: &[HealthCondition]) -> BTreeMap<String, bool> {
        HealthCondition::ALL
            .iter()
            .map(|c| (c.label().to_string(), conditions.contains(c)))
            .collect()
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <{}>", self.name, self.identifier)?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "Age: {}", self.age)?;
        if let Some(profession) = &self.profession {
            writeln!(f, "Profession: {}", profession)?;
        }

        let conditions = self.conditions();
        if conditions.is_empty() {
            writeln!(f, "Health Conditions: None")?;
        } else {
            let labels: Vec<&str> = conditions.iter().map(|c| c.label()).collect();
            writeln!(f, "Health Conditions: {}", labels.join(", "))?;
        }

        writeln!(f, "Daily Goal: {} ml", self.daily_goal)?;
        write!(f, "Member since: {}", self.created_at.format("%Y-%m-%d"))
    }
}

/// `created_at` is written as RFC 3339. Older files carry naive ISO 8601
/// timestamps without an offset; those are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}
