use crate::consts::{DAYS_IN_COMMON_YEAR, DAYS_IN_LEAP_YEAR, DECEMBER, LAST_ISO_WEEK_DAY};
use crate::prelude::*;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Error returned when a vocabulary token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Unknown frequency: {}", _0)]
    UnknownFrequency(String),
    #[display(fmt = "Unknown weekday: {}", _0)]
    UnknownWeekDay(String),
    #[display(fmt = "Unknown end condition type: {}", _0)]
    UnknownEndCondition(String),
}

impl std::error::Error for ParseError {}

/// Unit of periodicity of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[display(fmt = "SECONDLY")]
    Secondly,
    #[display(fmt = "MINUTELY")]
    Minutely,
    #[display(fmt = "HOURLY")]
    Hourly,
    #[display(fmt = "DAILY")]
    Daily,
    #[display(fmt = "WEEKLY")]
    Weekly,
    #[display(fmt = "MONTHLY")]
    Monthly,
    #[display(fmt = "YEARLY")]
    Yearly,
}

impl Frequency {
    /// All frequencies, finest first
    pub const ALL: [Self; 7] = [
        Self::Secondly,
        Self::Minutely,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
    ];
}

impl FromStr for Frequency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.to_string().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseError::UnknownFrequency(s.to_owned()))
    }
}

/// Day of the week, serialized with its two-letter RFC 5545 token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, Serialize, Deserialize,
)]
pub enum WeekDay {
    #[default]
    #[display(fmt = "MO")]
    #[serde(rename = "MO")]
    Monday,
    #[display(fmt = "TU")]
    #[serde(rename = "TU")]
    Tuesday,
    #[display(fmt = "WE")]
    #[serde(rename = "WE")]
    Wednesday,
    #[display(fmt = "TH")]
    #[serde(rename = "TH")]
    Thursday,
    #[display(fmt = "FR")]
    #[serde(rename = "FR")]
    Friday,
    #[display(fmt = "SA")]
    #[serde(rename = "SA")]
    Saturday,
    #[display(fmt = "SU")]
    #[serde(rename = "SU")]
    Sunday,
}

impl WeekDay {
    /// All weekdays, Monday first
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Weekday of a calendar date
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl FromStr for WeekDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseError::UnknownWeekDay(s.to_owned()))
    }
}

impl From<Weekday> for WeekDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl From<WeekDay> for Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Monday => Self::Mon,
            WeekDay::Tuesday => Self::Tue,
            WeekDay::Wednesday => Self::Wed,
            WeekDay::Thursday => Self::Thu,
            WeekDay::Friday => Self::Fri,
            WeekDay::Saturday => Self::Sat,
            WeekDay::Sunday => Self::Sun,
        }
    }
}

/// Discriminant of an [`EndCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndConditionType {
    #[display(fmt = "NEVER")]
    Never,
    #[display(fmt = "UNTIL")]
    Until,
    #[display(fmt = "COUNT")]
    Count,
}

impl FromStr for EndConditionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        [Self::Never, Self::Until, Self::Count]
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseError::UnknownEndCondition(s.to_owned()))
    }
}

/// How a recurring series terminates.
///
/// Serialized as `{"type": "UNTIL", "until": "2025-12-31"}`,
/// `{"type": "COUNT", "count": 5}` or `{"type": "NEVER"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndCondition {
    /// The series never ends
    #[default]
    Never,
    /// The series ends on this date (inclusive)
    Until { until: NaiveDate },
    /// The series has this many occurrences on or after the anchor
    Count { count: u32 },
}

impl EndCondition {
    /// Returns the discriminant of this condition
    pub const fn kind(&self) -> EndConditionType {
        match self {
            Self::Never => EndConditionType::Never,
            Self::Until { .. } => EndConditionType::Until,
            Self::Count { .. } => EndConditionType::Count,
        }
    }

    /// Returns the last allowed date if this is an `Until` condition
    pub const fn until(&self) -> Option<NaiveDate> {
        match *self {
            Self::Until { until } => Some(until),
            Self::Never | Self::Count { .. } => None,
        }
    }

    /// Returns the occurrence cap if this is a `Count` condition
    pub const fn count(&self) -> Option<u32> {
        match *self {
            Self::Count { count } => Some(count),
            Self::Never | Self::Until { .. } => None,
        }
    }
}

// Helper functions

/// Number of days (365 or 366) in a calendar year.
pub fn days_in_year(year: i32) -> u32 {
    // Only leap years have a 366th day
    NaiveDate::from_yo_opt(year, DAYS_IN_LEAP_YEAR)
        .map_or(DAYS_IN_COMMON_YEAR, |d| d.ordinal())
}

/// Number of ISO weeks (52 or 53) in an ISO week-based year.
pub fn iso_weeks_in_year(iso_year: i32) -> u32 {
    NaiveDate::from_ymd_opt(iso_year, DECEMBER, LAST_ISO_WEEK_DAY)
        .map_or(52, |d| d.iso_week().week())
}
