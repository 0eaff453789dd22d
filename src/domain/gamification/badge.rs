//! Achievement badges earned from progress and streaks.

use serde::Serialize;

use super::EnrollmentStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    Starter,
    Achiever,
    Finisher,
    #[serde(rename = "streak-3")]
    Streak3,
    #[serde(rename = "streak-7")]
    Streak7,
    #[serde(rename = "streak-14")]
    Streak14,
}

impl Badge {
    /// Returns all badges in award order.
    pub fn all() -> &'static [Badge] {
        &[
            Badge::Starter,
            Badge::Achiever,
            Badge::Finisher,
            Badge::Streak3,
            Badge::Streak7,
            Badge::Streak14,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Badge::Starter => "starter",
            Badge::Achiever => "achiever",
            Badge::Finisher => "finisher",
            Badge::Streak3 => "streak-3",
            Badge::Streak7 => "streak-7",
            Badge::Streak14 => "streak-14",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Starter => "Starter",
            Badge::Achiever => "Achiever",
            Badge::Finisher => "Finisher",
            Badge::Streak3 => "3-day Streak",
            Badge::Streak7 => "7-day Streak",
            Badge::Streak14 => "14-day Streak",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Badge::Starter => "Enrolled in your first course",
            Badge::Achiever => "Reached 50% in a course",
            Badge::Finisher => "Completed a course",
            Badge::Streak3 => "Learned 3 days in a row",
            Badge::Streak7 => "Learned 7 days in a row",
            Badge::Streak14 => "Kept momentum for two weeks",
        }
    }

    fn is_earned(&self, stats: &EnrollmentStats, streak: u32) -> bool {
        match self {
            Badge::Starter => stats.total_courses > 0,
            Badge::Achiever => stats.max_progress >= 50,
            Badge::Finisher => stats.max_progress >= 100,
            Badge::Streak3 => streak >= 3,
            Badge::Streak7 => streak >= 7,
            Badge::Streak14 => streak >= 14,
        }
    }
}

/// Every badge the stats and streak qualify for, in award order.
pub fn earned_badges(stats: &EnrollmentStats, streak: u32) -> Vec<Badge> {
    Badge::all()
        .iter()
        .copied()
        .filter(|b| b.is_earned(stats, streak))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: usize, max: u8) -> EnrollmentStats {
        EnrollmentStats {
            total_courses: total,
            avg_progress: max,
            max_progress: max,
        }
    }

    #[test]
    fn nothing_earned_without_activity() {
        assert!(earned_badges(&EnrollmentStats::default(), 0).is_empty());
    }

    #[test]
    fn progress_thresholds() {
        assert_eq!(earned_badges(&stats(1, 49), 0), vec![Badge::Starter]);
        assert_eq!(
            earned_badges(&stats(2, 100), 0),
            vec![Badge::Starter, Badge::Achiever, Badge::Finisher]
        );
    }

    #[test]
    fn streak_thresholds() {
        assert_eq!(earned_badges(&EnrollmentStats::default(), 7), vec![Badge::Streak3, Badge::Streak7]);
        assert_eq!(earned_badges(&EnrollmentStats::default(), 14).len(), 3);
    }

    #[test]
    fn serializes_with_stable_ids() {
        for badge in Badge::all() {
            let json = serde_json::to_string(badge).unwrap();
            assert_eq!(json, format!("\"{}\"", badge.id()));
        }
    }
}
