//! Shared helpers for unit tests.

use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid test date {year:04}-{month:02}-{day:02}"))
}

/// Dates of a single month, for compact expectations
pub fn days_of(year: i32, month: u32, days: &[u32]) -> Vec<NaiveDate> {
    days.iter().map(|&d| date(year, month, d)).collect()
}
