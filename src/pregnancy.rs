//! Pregnancy clock: gestational week, trimester and week-specific guidance
//! derived from a due date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_days, days_between, weeks_between};
use crate::reference::{DangerSign, PregnancyGuide, ReferenceData};

/// Standard gestation from conception reference to due date.
pub const GESTATION_DAYS: i64 = 280;
pub const MIN_WEEK: u32 = 1;
pub const MAX_WEEK: u32 = 42;

/// Derived state of a pregnancy as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyStatus {
    pub current_week: u32,
    pub trimester: u8,
    pub weeks_remaining: u32,
}

/// Guidance for one gestational week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyInfo {
    pub week: u32,
    pub trimester: u8,
    pub baby_size: String,
    pub symptoms: Vec<String>,
    pub tips: Vec<String>,
    pub recommended_appointments: Vec<String>,
}

pub fn conception_date(due_date: NaiveDate) -> NaiveDate {
    add_days(due_date, -GESTATION_DAYS)
}

/// Current gestational week, clamped to `MIN_WEEK..=MAX_WEEK`.
/// Total over all dates: counted from the due-date offset, never from a
/// materialized conception date.
pub fn pregnancy_week(due_date: NaiveDate, today: NaiveDate) -> u32 {
    let weeks = (days_between(due_date, today) + GESTATION_DAYS).div_euclid(7);
    weeks.clamp(MIN_WEEK as i64, MAX_WEEK as i64) as u32
}

pub fn trimester(week: u32) -> u8 {
    match week {
        0..=12 => 1,
        13..=27 => 2,
        _ => 3,
    }
}

/// Whole weeks until the due date; zero once it has passed.
pub fn weeks_remaining(due_date: NaiveDate, today: NaiveDate) -> u32 {
    weeks_between(today, due_date).max(0) as u32
}

pub fn pregnancy_status(due_date: NaiveDate, today: NaiveDate) -> PregnancyStatus {
    let current_week = pregnancy_week(due_date, today);
    PregnancyStatus {
        current_week,
        trimester: trimester(current_week),
        weeks_remaining: weeks_remaining(due_date, today),
    }
}

/// Comparison for the largest size threshold at or below `week`.
pub fn baby_size(guide: &PregnancyGuide, week: u32) -> &str {
    guide
        .baby_sizes
        .iter()
        .rev()
        .find(|s| week >= s.from_week)
        .map(|s| s.comparison.as_str())
        .unwrap_or(guide.smallest_baby_size.as_str())
}

pub fn recommended_appointments(guide: &PregnancyGuide, week: u32) -> Vec<String> {
    guide
        .appointments
        .iter()
        .filter(|rule| rule.applies_to(week))
        .map(|rule| rule.name.clone())
        .collect()
}

pub fn weekly_info(guide: &PregnancyGuide, week: u32) -> WeeklyInfo {
    let trimester = trimester(week);
    let (symptoms, tips) = guide
        .trimester(trimester)
        .map(|t| (t.symptoms.clone(), t.tips.clone()))
        .unwrap_or_default();

    WeeklyInfo {
        week,
        trimester,
        baby_size: baby_size(guide, week).to_string(),
        symptoms,
        tips,
        recommended_appointments: recommended_appointments(guide, week),
    }
}

pub fn danger_signs(reference: &ReferenceData) -> &[DangerSign] {
    &reference.danger_signs
}
