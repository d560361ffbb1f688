use std::fmt;
use std::str::FromStr;

/// Health conditions that raise the daily goal.
///
/// Persisted by label inside `health_conditions`, e.g. `{"Heart Issue": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HealthCondition {
    Heart,
    Diabetes,
    Kidney,
}

impl HealthCondition {
    pub const ALL: [HealthCondition; 3] = [
        HealthCondition::Heart,
        HealthCondition::Diabetes,
        HealthCondition::Kidney,
    ];

    /// Key used in the persisted `health_conditions` map.
    pub fn label(&self) -> &'static str {
        match self {
            HealthCondition::Heart => "Heart Issue",
            HealthCondition::Diabetes => "Diabetes",
            HealthCondition::Kidney => "Kidney Issue",
        }
    }

    /// Additive goal adjustment in percent.
    pub fn adjustment_percent(&self) -> u32 {
        match self {
            HealthCondition::Heart => 12,
            HealthCondition::Diabetes => 10,
            HealthCondition::Kidney => 15,
        }
    }

    /// Looks up a condition by its persisted label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for HealthCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for HealthCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heart" | "heart issue" => Ok(HealthCondition::Heart),
            "diabetes" => Ok(HealthCondition::Diabetes),
            "kidney" | "kidney issue" => Ok(HealthCondition::Kidney),
            _ => Err(format!(
                "Invalid health condition '{}'. Valid options: heart, diabetes, kidney",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            HealthCondition::from_str("heart").unwrap(),
            HealthCondition::Heart
        );
        assert_eq!(
            HealthCondition::from_str("Kidney Issue").unwrap(),
            HealthCondition::Kidney
        );
        assert_eq!(
            HealthCondition::from_str("DIABETES").unwrap(),
            HealthCondition::Diabetes
        );
        assert!(HealthCondition::from_str("asthma").is_err());
    }

    #[test]
    fn test_label_roundtrip() {
        for condition in HealthCondition::ALL {
            assert_eq!(HealthCondition::from_label(condition.label()), Some(condition));
        }
        assert_eq!(HealthCondition::from_label("heart"), None);
    }
}
