//! Calendar arithmetic shared by the pregnancy clock, scheduler and growth estimator.
//!
//! "Today" is always an explicit argument; nothing here reads the clock.

use chrono::{Duration, NaiveDate};

/// Days in the month used for age-in-months. Fixed at 30, not calendar months.
pub const DAYS_PER_MONTH: i64 = 30;

/// Signed day count from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn age_in_days(birth_date: NaiveDate, on: NaiveDate) -> i64 {
    days_between(birth_date, on)
}

/// Age in whole 30-day months, floored. Dates before birth give negative ages.
pub fn age_in_months(birth_date: NaiveDate, on: NaiveDate) -> i64 {
    age_in_days(birth_date, on).div_euclid(DAYS_PER_MONTH)
}

/// Whole weeks from `from` to `to`, floored toward negative infinity.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(from, to).div_euclid(7)
}

/// `date` shifted by `days`, saturating at the ends of the calendar range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 31)), 30);
        assert_eq!(days_between(d(2024, 1, 31), d(2024, 1, 1)), -30);
        assert_eq!(days_between(d(2024, 2, 28), d(2024, 3, 1)), 2); // leap year
    }

    #[test]
    fn age_in_months_uses_thirty_day_months() {
        let birth = d(2024, 1, 1);
        assert_eq!(age_in_months(birth, d(2024, 1, 30)), 0);
        assert_eq!(age_in_months(birth, d(2024, 1, 31)), 1);
        assert_eq!(age_in_months(birth, d(2024, 12, 31)), 12); // 365 days
    }

    #[test]
    fn age_before_birth_floors_negative() {
        let birth = d(2024, 1, 10);
        assert_eq!(age_in_months(birth, d(2024, 1, 9)), -1);
        assert_eq!(age_in_months(birth, birth), 0);
    }

    #[test]
    fn weeks_between_floors() {
        let start = d(2024, 3, 1);
        assert_eq!(weeks_between(start, d(2024, 3, 7)), 0);
        assert_eq!(weeks_between(start, d(2024, 3, 8)), 1);
        assert_eq!(weeks_between(start, d(2024, 2, 29)), -1);
    }

    #[test]
    fn add_days_handles_month_boundaries() {
        assert_eq!(add_days(d(2024, 1, 1), 42), d(2024, 2, 12));
        assert_eq!(add_days(d(2024, 1, 1), 540), d(2025, 6, 24));
        assert_eq!(add_days(d(2024, 1, 1), -1), d(2023, 12, 31));
    }

    #[test]
    fn add_days_saturates_instead_of_overflowing() {
        assert_eq!(add_days(NaiveDate::MIN, -280), NaiveDate::MIN);
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(d(2024, 1, 1), i64::MIN), NaiveDate::MIN);
        assert_eq!(add_days(d(2024, 1, 1), i64::MAX), NaiveDate::MAX);
    }
}
