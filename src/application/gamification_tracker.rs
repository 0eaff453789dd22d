//! GamificationTracker - activity-day history and derived achievements.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::Identity;
use crate::domain::gamification::{
    current_streak, format_day, parse_days, EnrollmentStats, GamificationSummary,
};
use crate::ports::KeyValueStore;

/// Storage key prefix; the identity namespace is appended.
pub const ACTIVITY_DAYS_KEY_PREFIX: &str = "smartedu-activity-days";

pub fn activity_days_storage_key(identity: &Identity) -> String {
    format!("{}.{}", ACTIVITY_DAYS_KEY_PREFIX, identity.namespace())
}

pub struct GamificationTracker {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl GamificationTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, identity: &Identity) -> Self {
        Self {
            store,
            key: activity_days_storage_key(identity),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Days with recorded activity; empty when missing or unreadable.
    pub fn activity_days(&self) -> BTreeSet<NaiveDate> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to read activity days: {}", e);
                return BTreeSet::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(days) => parse_days(days.iter().map(String::as_str)),
            Err(e) => {
                tracing::warn!(key = %self.key, "discarding unreadable activity days: {}", e);
                BTreeSet::new()
            }
        }
    }

    /// Marks `today` as active. Returns false if it already was.
    pub fn record_activity(&self, today: NaiveDate) -> bool {
        let mut days = self.activity_days();
        if !days.insert(today) {
            return false;
        }
        let stored: Vec<String> = days.into_iter().map(format_day).collect();
        let result = serde_json::to_string(&stored)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(&self.key, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, "failed to persist activity days: {}", e);
        }
        true
    }

    /// Consecutive active days ending at `today`.
    pub fn streak(&self, today: NaiveDate) -> u32 {
        current_streak(&self.activity_days(), today)
    }

    pub fn summary(&self, enrollments: &[Enrollment], today: NaiveDate) -> GamificationSummary {
        GamificationSummary::compute(
            EnrollmentStats::from_enrollments(enrollments),
            self.streak(today),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKeyValueStore;
    use crate::domain::foundation::{CourseId, EnrollmentId, Percentage};
    use crate::domain::gamification::Badge;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tracker() -> (InMemoryKeyValueStore, GamificationTracker) {
        let store = InMemoryKeyValueStore::new();
        let tracker = GamificationTracker::new(Arc::new(store.clone()), &Identity::Guest);
        (store, tracker)
    }

    #[test]
    fn record_activity_is_idempotent() {
        let (store, tracker) = tracker();
        assert!(tracker.record_activity(day("2026-03-10")));
        assert!(!tracker.record_activity(day("2026-03-10")));
        assert_eq!(
            store.get("smartedu-activity-days.guest").unwrap().as_deref(),
            Some(r#"["2026-03-10"]"#)
        );
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let (_, tracker) = tracker();
        for d in ["2026-03-07", "2026-03-08", "2026-03-09", "2026-03-10"] {
            tracker.record_activity(day(d));
        }
        assert_eq!(tracker.streak(day("2026-03-10")), 4);
        assert_eq!(tracker.streak(day("2026-03-11")), 0);
    }

    #[test]
    fn corrupt_history_reads_empty() {
        let (store, tracker) = tracker();
        store.set("smartedu-activity-days.guest", "not-a-list").unwrap();
        assert!(tracker.activity_days().is_empty());
        assert!(tracker.record_activity(day("2026-03-10")));
        assert_eq!(tracker.activity_days().len(), 1);
    }

    #[test]
    fn summary_combines_stats_and_streak() {
        let (_, tracker) = tracker();
        for d in ["2026-03-08", "2026-03-09", "2026-03-10"] {
            tracker.record_activity(day(d));
        }
        let enrollments = vec![Enrollment::with_progress(
            EnrollmentId::new(),
            CourseId::new("c1").unwrap(),
            Percentage::new(60),
        )];

        let summary = tracker.summary(&enrollments, day("2026-03-10"));

        assert_eq!(summary.streak, 3);
        assert_eq!(summary.stats.avg_progress, 60);
        assert_eq!(
            summary.badges,
            vec![Badge::Starter, Badge::Achiever, Badge::Streak3]
        );
    }
}
