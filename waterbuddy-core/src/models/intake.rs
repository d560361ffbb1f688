use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::goal::{progress_percent, raw_percent, ProgressMood};

/// Millilitres logged on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_ml: u32,
}

/// Today's standing against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total_ml: u32,
    pub goal_ml: u32,
    /// Clamped to `0..=100`.
    pub percent: u8,
    pub mood: ProgressMood,
}

impl Progress {
    pub fn new(total_ml: u32, goal_ml: u32) -> Self {
        Self {
            total_ml,
            goal_ml,
            percent: progress_percent(total_ml, goal_ml),
            mood: ProgressMood::from_percent(raw_percent(total_ml, goal_ml)),
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.percent >= 100
    }

    pub fn remaining_ml(&self) -> u32 {
        self.goal_ml.saturating_sub(self.total_ml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_halfway() {
        let progress = Progress::new(1000, 2000);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.mood, ProgressMood::Sleepy);
        assert_eq!(progress.remaining_ml(), 1000);
        assert!(!progress.goal_reached());
    }

    #[test]
    fn test_progress_over_goal() {
        let progress = Progress::new(2600, 2000);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.mood, ProgressMood::Celebrating);
        assert_eq!(progress.remaining_ml(), 0);
        assert!(progress.goal_reached());
    }

    #[test]
    fn test_daily_total_json_shape() {
        let total = DailyTotal {
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            total_ml: 750,
        };
        let json = serde_json::to_string(&total).unwrap();
        assert_eq!(json, r#"{"date":"2025-04-02","total_ml":750}"#);
    }
}
