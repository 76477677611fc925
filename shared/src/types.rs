//! Common types used across the platform

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending at (and including) `end`
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days.max(1) - 1),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_trailing_week_is_inclusive() {
        let range = DateRange::trailing(date("2025-03-10"), 7);
        assert_eq!(range.start, date("2025-03-04"));
        assert!(range.contains(date("2025-03-04")));
        assert!(range.contains(date("2025-03-10")));
        assert!(!range.contains(date("2025-03-03")));
        assert!(!range.contains(date("2025-03-11")));
    }

    #[test]
    fn test_days_between_crosses_month() {
        assert_eq!(days_between(date("2025-01-25"), date("2025-02-04")), 10);
        assert_eq!(days_between(date("2025-02-04"), date("2025-01-25")), -10);
    }
}
