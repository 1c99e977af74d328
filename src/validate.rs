//! Range checks for the numeric BY-fields of a rule.
//!
//! Independent of the engine: the engine skips values it cannot place, while
//! this reports each offending value so it can be surfaced to the user.

use std::collections::BTreeSet;

use crate::consts::{
    LAST_SET_POS, MAX_HOUR, MAX_MINUTE, MAX_MONTH, MAX_MONTH_DAY, MAX_SECOND, MAX_SET_POS,
    MAX_WEEK_NO, MAX_YEAR_DAY, MIN_HOUR, MIN_MINUTE, MIN_MONTH, MIN_SECOND,
};
use crate::prelude::*;
use crate::RecurrenceRule;

/// A numeric BY-field, displayed with its JSON field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum RuleField {
    #[display(fmt = "byMonth")]
    ByMonth,
    #[display(fmt = "byMonthDay")]
    ByMonthDay,
    #[display(fmt = "bySetPos")]
    BySetPos,
    #[display(fmt = "byHour")]
    ByHour,
    #[display(fmt = "byMinute")]
    ByMinute,
    #[display(fmt = "bySecond")]
    BySecond,
    #[display(fmt = "byWeekNo")]
    ByWeekNo,
    #[display(fmt = "byYearDay")]
    ByYearDay,
}

/// Accepted values of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Range {
    /// `min..=max`
    Span(i32, i32),
    /// `1..=max` or `-max..=-1`
    Signed(i32),
    /// `1..=max` or exactly `-1`
    PositiveOrLast(i32),
}

impl Range {
    fn contains(self, value: i32) -> bool {
        match self {
            Self::Span(min, max) => (min..=max).contains(&value),
            Self::Signed(max) => (1..=max).contains(&value) || (-max..=-1).contains(&value),
            Self::PositiveOrLast(max) => value == LAST_SET_POS || (1..=max).contains(&value),
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Span(min, max) => write!(f, "{min}..={max}"),
            Self::Signed(max) => write!(f, "1..={max} or -{max}..=-1"),
            Self::PositiveOrLast(max) => write!(f, "1..={max} or {LAST_SET_POS}"),
        }
    }
}

impl RuleField {
    const fn range(self) -> Range {
        match self {
            Self::ByMonth => Range::Span(MIN_MONTH, MAX_MONTH),
            Self::ByMonthDay => Range::Span(1, MAX_MONTH_DAY),
            Self::BySetPos => Range::PositiveOrLast(MAX_SET_POS),
            Self::ByHour => Range::Span(MIN_HOUR, MAX_HOUR),
            Self::ByMinute => Range::Span(MIN_MINUTE, MAX_MINUTE),
            Self::BySecond => Range::Span(MIN_SECOND, MAX_SECOND),
            Self::ByWeekNo => Range::Signed(MAX_WEEK_NO),
            Self::ByYearDay => Range::Signed(MAX_YEAR_DAY),
        }
    }

    /// Human readable description of the accepted values
    pub fn accepted(self) -> String {
        self.range().to_string()
    }

    fn values(self, rule: &RecurrenceRule) -> &BTreeSet<i32> {
        match self {
            Self::ByMonth => rule.by_month(),
            Self::ByMonthDay => rule.by_month_day(),
            Self::BySetPos => rule.by_set_pos(),
            Self::ByHour => rule.by_hour(),
            Self::ByMinute => rule.by_minute(),
            Self::BySecond => rule.by_second(),
            Self::ByWeekNo => rule.by_week_no(),
            Self::ByYearDay => rule.by_year_day(),
        }
    }
}

const CHECKED_FIELDS: [RuleField; 8] = [
    RuleField::ByMonth,
    RuleField::ByMonthDay,
    RuleField::BySetPos,
    RuleField::ByHour,
    RuleField::ByMinute,
    RuleField::BySecond,
    RuleField::ByWeekNo,
    RuleField::ByYearDay,
];

/// One out-of-range value in a BY-field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be within {accepted}, got {value}", accepted = .field.accepted())]
pub struct FieldError {
    pub field: RuleField,
    pub value: i32,
}

impl FieldError {
    /// Message suitable for a field-tagged validation response
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Checks every populated BY-field against its numeric range.
///
/// # Errors
/// Returns one `FieldError` per offending value, grouped by field and in
/// ascending value order within a field.
pub fn validate(rule: &RecurrenceRule) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = CHECKED_FIELDS
        .into_iter()
        .flat_map(|field| {
            let range = field.range();
            field
                .values(rule)
                .iter()
                .filter(move |&&value| !range.contains(value))
                .map(move |&value| FieldError { field, value })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(errors = errors.len(), "recurrence rule failed validation");
        Err(errors)
    }
}
