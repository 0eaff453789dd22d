//! Gamification - streaks, progress stats and badges.
//!
//! Pure functions over the enrollment list and the set of active days;
//! persistence of the days lives in the application layer.

mod badge;
mod stats;
mod streak;

pub use badge::{earned_badges, Badge};
pub use stats::EnrollmentStats;
pub use streak::{current_streak, format_day, parse_days, DAY_FORMAT};

use serde::Serialize;

/// Everything a progress dashboard shows about achievements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamificationSummary {
    pub stats: EnrollmentStats,
    pub streak: u32,
    pub badges: Vec<Badge>,
}

impl GamificationSummary {
    pub fn compute(stats: EnrollmentStats, streak: u32) -> Self {
        Self {
            badges: earned_badges(&stats, streak),
            stats,
            streak,
        }
    }
}
