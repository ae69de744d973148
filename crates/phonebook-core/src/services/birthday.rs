//! Recurring-birthday date arithmetic (year ignored)

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which day to look at relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BirthdayWindow {
    Today,
    Tomorrow,
}

impl BirthdayWindow {
    pub fn offset_days(&self) -> u64 {
        match self {
            BirthdayWindow::Today => 0,
            BirthdayWindow::Tomorrow => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BirthdayWindow::Today => "today",
            BirthdayWindow::Tomorrow => "tomorrow",
        }
    }
}

/// Calendar day without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    /// The month/day `window` lands on when counted from `today`. Month and
    /// year rollover come from real calendar arithmetic.
    pub fn for_window(today: NaiveDate, window: BirthdayWindow) -> Self {
        let target = today
            .checked_add_days(Days::new(window.offset_days()))
            .unwrap_or(today);
        Self { month: target.month(), day: target.day() }
    }

    pub fn matches(&self, birth_date: NaiveDate) -> bool {
        birth_date.month() == self.month && birth_date.day() == self.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today() {
        let md = MonthDay::for_window(date(2026, 10, 18), BirthdayWindow::Today);
        assert_eq!(md, MonthDay { month: 10, day: 18 });
    }

    #[test]
    fn test_tomorrow_across_year_end() {
        let md = MonthDay::for_window(date(2025, 12, 31), BirthdayWindow::Tomorrow);
        assert_eq!(md, MonthDay { month: 1, day: 1 });
        assert!(md.matches(date(1985, 1, 1)));
        assert!(!md.matches(date(1985, 12, 31)));
        assert!(!md.matches(date(1985, 1, 2)));
    }

    #[test]
    fn test_tomorrow_across_month_end() {
        assert_eq!(
            MonthDay::for_window(date(2026, 4, 30), BirthdayWindow::Tomorrow),
            MonthDay { month: 5, day: 1 }
        );
        assert_eq!(
            MonthDay::for_window(date(2024, 2, 28), BirthdayWindow::Tomorrow),
            MonthDay { month: 2, day: 29 }
        );
        assert_eq!(
            MonthDay::for_window(date(2025, 2, 28), BirthdayWindow::Tomorrow),
            MonthDay { month: 3, day: 1 }
        );
    }

    #[test]
    fn test_year_ignored() {
        let md = MonthDay { month: 7, day: 4 };
        assert!(md.matches(date(1950, 7, 4)));
        assert!(md.matches(date(2001, 7, 4)));
    }
}
