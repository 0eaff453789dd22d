//! Consecutive-day activity streaks.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Storage format of an activity day (`YYYY-MM-DD`).
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Counts consecutive active days ending at `today`.
///
/// Zero when `today` itself has no activity.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Parses stored day strings, silently skipping malformed entries.
pub fn parse_days<'a>(raw: impl IntoIterator<Item = &'a str>) -> BTreeSet<NaiveDate> {
    raw.into_iter()
        .filter_map(|s| NaiveDate::parse_from_str(s, DAY_FORMAT).ok())
        .collect()
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(&BTreeSet::new(), day("2026-03-10")), 0);
    }

    #[test]
    fn counts_back_from_today() {
        let days = parse_days(["2026-03-08", "2026-03-09", "2026-03-10", "2026-03-05"]);
        assert_eq!(current_streak(&days, day("2026-03-10")), 3);
    }

    #[test]
    fn missing_today_breaks_streak() {
        let days = parse_days(["2026-03-08", "2026-03-09"]);
        assert_eq!(current_streak(&days, day("2026-03-10")), 0);
    }

    #[test]
    fn crosses_month_boundaries() {
        let days = parse_days(["2026-02-28", "2026-03-01"]);
        assert_eq!(current_streak(&days, day("2026-03-01")), 2);
    }

    #[test]
    fn malformed_days_are_skipped() {
        let days = parse_days(["2026-03-10", "yesterday", "2026-13-01"]);
        assert_eq!(days.len(), 1);
        assert_eq!(format_day(day("2026-03-10")), "2026-03-10");
    }
}
