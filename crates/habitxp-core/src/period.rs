//! Calendar period membership.
//!
//! A task's repeat target (`times`) must be met within a period window
//! derived from its frequency. Pure date math, no state.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a task's repeat target resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    /// One-shot tasks: a single, unbounded period.
    None,
}

impl Frequency {
    /// Whether `date` falls in the same period as `reference`.
    ///
    /// Weeks are pinned to ISO-8601: a week belongs to the year containing
    /// its Thursday, so the week-year and the calendar year disagree in the
    /// days around New Year.
    pub fn same_period(&self, reference: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Frequency::Daily => reference == date,
            Frequency::Weekly => {
                let (a, b) = (reference.iso_week(), date.iso_week());
                a.week() == b.week() && a.year() == b.year()
            }
            Frequency::Monthly => {
                reference.month() == date.month() && reference.year() == date.year()
            }
            Frequency::None => true,
        }
    }

    /// Recurring frequencies contribute to the daily streak.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_matches_same_calendar_date_only() {
        assert!(Frequency::Daily.same_period(d(2025, 3, 14), d(2025, 3, 14)));
        assert!(!Frequency::Daily.same_period(d(2025, 3, 14), d(2025, 3, 15)));
    }

    #[test]
    fn weekly_uses_iso_weeks() {
        // Monday and Sunday of the same ISO week.
        assert!(Frequency::Weekly.same_period(d(2025, 3, 10), d(2025, 3, 16)));
        // Sunday vs the following Monday.
        assert!(!Frequency::Weekly.same_period(d(2025, 3, 16), d(2025, 3, 17)));
    }

    #[test]
    fn weekly_spans_new_year_when_iso_week_does() {
        // 2024-12-30 (Mon) and 2025-01-02 (Thu) are both ISO week 1 of 2025.
        assert!(Frequency::Weekly.same_period(d(2024, 12, 30), d(2025, 1, 2)));
        // Same week number, different week-year: week 1 of 2025 vs week 1 of 2024.
        assert!(!Frequency::Weekly.same_period(d(2025, 1, 2), d(2024, 1, 2)));
    }

    #[test]
    fn monthly_compares_month_and_year() {
        assert!(Frequency::Monthly.same_period(d(2025, 3, 1), d(2025, 3, 31)));
        assert!(!Frequency::Monthly.same_period(d(2025, 3, 1), d(2025, 4, 1)));
        assert!(!Frequency::Monthly.same_period(d(2025, 3, 1), d(2024, 3, 1)));
    }

    #[test]
    fn none_is_a_single_unbounded_period() {
        assert!(Frequency::None.same_period(d(2025, 1, 1), d(1999, 7, 20)));
    }

    #[test]
    fn serde_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&Frequency::Daily).unwrap(), "\"DAILY\"");
        assert_eq!(serde_json::to_string(&Frequency::None).unwrap(), "\"NONE\"");
    }
}
