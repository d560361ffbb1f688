//! Daily goal and progress arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::HealthCondition;

/// Base goal for adults between 18 and 60.
pub const ADULT_BASE_GOAL_ML: u32 = 2000;
/// Base goal for anyone under 18.
pub const MINOR_BASE_GOAL_ML: u32 = 1800;
/// Base goal for anyone over 60.
pub const SENIOR_BASE_GOAL_ML: u32 = 1700;

/// Base goal for an age, before health adjustments.
pub fn base_goal(age: u32) -> u32 {
    if age < 18 {
        MINOR_BASE_GOAL_ML
    } else if age > 60 {
        SENIOR_BASE_GOAL_ML
    } else {
        ADULT_BASE_GOAL_ML
    }
}

/// Sum of the percentage adjustments of all active conditions.
///
/// Duplicates count once.
pub fn adjustment_percent(conditions: &[HealthCondition]) -> u32 {
    HealthCondition::ALL
        .iter()
        .filter(|c| conditions.contains(c))
        .map(|c| c.adjustment_percent())
        .sum()
}

/// Computes the daily goal in millilitres.
///
/// Adjustments are added together and applied once to the base goal, then
/// truncated. Integer arithmetic keeps the result exact, e.g. a senior with
/// a kidney condition gets 1700 * 115 / 100 = 1955.
pub fn calculate_daily_goal(age: u32, conditions: &[HealthCondition]) -> u32 {
    let base = u64::from(base_goal(age));
    let multiplier = 100 + u64::from(adjustment_percent(conditions));
    (base * multiplier / 100) as u32
}

/// Unclamped percentage of the goal reached. A zero goal counts as 0%.
pub fn raw_percent(total_ml: u32, goal_ml: u32) -> u32 {
    if goal_ml == 0 {
        return 0;
    }
    let percent = u64::from(total_ml) * 100 / u64::from(goal_ml);
    percent.min(u64::from(u32::MAX)) as u32
}

/// Percentage of the goal reached, clamped to `0..=100`.
pub fn progress_percent(total_ml: u32, goal_ml: u32) -> u8 {
    raw_percent(total_ml, goal_ml).min(100) as u8
}

/// How the buddy feels about today's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMood {
    Grumpy,
    Sleepy,
    Happy,
    Celebrating,
}

impl ProgressMood {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            p if p >= 100 => ProgressMood::Celebrating,
            p if p >= 75 => ProgressMood::Happy,
            p if p >= 50 => ProgressMood::Sleepy,
            _ => ProgressMood::Grumpy,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ProgressMood::Celebrating => "🎉🥳",
            ProgressMood::Happy => "🙂",
            ProgressMood::Sleepy => "😴",
            ProgressMood::Grumpy => "😠",
        }
    }
}

impl fmt::Display for ProgressMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressMood::Grumpy => write!(f, "grumpy"),
            ProgressMood::Sleepy => write!(f, "sleepy"),
            ProgressMood::Happy => write!(f, "happy"),
            ProgressMood::Celebrating => write!(f, "celebrating"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_goal_by_age() {
        for age in [1, 10, 17] {
            assert_eq!(base_goal(age), 1800);
        }
        for age in [18, 30, 60] {
            assert_eq!(base_goal(age), 2000);
        }
        for age in [61, 75, 120] {
            assert_eq!(base_goal(age), 1700);
        }
    }

    #[test]
    fn test_goal_without_conditions() {
        assert_eq!(calculate_daily_goal(30, &[]), 2000);
        assert_eq!(calculate_daily_goal(12, &[]), 1800);
        assert_eq!(calculate_daily_goal(70, &[]), 1700);
    }

    #[test]
    fn test_goal_heart_and_diabetes() {
        let goal = calculate_daily_goal(30, &[HealthCondition::Heart, HealthCondition::Diabetes]);
        assert_eq!(goal, 2440);
    }

    #[test]
    fn test_goal_all_conditions() {
        let all = HealthCondition::ALL;
        // 2000 * 1.37
        assert_eq!(calculate_daily_goal(40, &all), 2740);
        // 1800 * 1.37
        assert_eq!(calculate_daily_goal(16, &all), 2466);
    }

    #[test]
    fn test_goal_senior_kidney_is_exact() {
        assert_eq!(calculate_daily_goal(65, &[HealthCondition::Kidney]), 1955);
    }

    #[test]
    fn test_duplicate_conditions_count_once() {
        let goal = calculate_daily_goal(30, &[HealthCondition::Heart, HealthCondition::Heart]);
        assert_eq!(goal, 2240);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 2000), 0);
        assert_eq!(progress_percent(1000, 2000), 50);
        assert_eq!(progress_percent(1999, 2000), 99);
        assert_eq!(progress_percent(2000, 2000), 100);
        assert_eq!(progress_percent(3000, 2000), 100);
    }

    #[test]
    fn test_progress_percent_zero_goal() {
        assert_eq!(progress_percent(500, 0), 0);
        assert_eq!(raw_percent(500, 0), 0);
    }

    #[test]
    fn test_raw_percent_is_unclamped() {
        assert_eq!(raw_percent(3000, 2000), 150);
    }

    #[test]
    fn test_mood_tiers() {
        assert_eq!(ProgressMood::from_percent(0), ProgressMood::Grumpy);
        assert_eq!(ProgressMood::from_percent(49), ProgressMood::Grumpy);
        assert_eq!(ProgressMood::from_percent(50), ProgressMood::Sleepy);
        assert_eq!(ProgressMood::from_percent(75), ProgressMood::Happy);
        assert_eq!(ProgressMood::from_percent(100), ProgressMood::Celebrating);
        assert_eq!(ProgressMood::from_percent(180), ProgressMood::Celebrating);
        assert_eq!(ProgressMood::Celebrating.emoji(), "🎉🥳");
    }
}
