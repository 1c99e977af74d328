//! Expansion of RRULE-style recurrence rules into calendar dates.
//!
//! A [`RecurrenceRule`] describes how a task repeats: a base [`Frequency`],
//! an interval, optional BY-filters, an [`EndCondition`], and explicit
//! excluded and added dates. [`generate_between`] turns a rule into the
//! sorted, de-duplicated dates it produces inside an inclusive window.
//!
//! ```
//! use chrono::NaiveDate;
//! use recurring_dates::{Frequency, RecurrenceRule, WeekDay, generate_between};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 1, 19).unwrap();
//! let rule = RecurrenceRule::builder(Frequency::Weekly)
//!     .anchor(start)
//!     .by_week_days([WeekDay::Monday, WeekDay::Friday])
//!     .build();
//!
//! let dates = generate_between(&rule, start, end);
//! assert_eq!(dates.len(), 4);
//! ```

mod consts;
mod engine;
mod prelude;
mod rule;
#[cfg(test)]
mod test_utils;
mod types;
mod validate;

pub use consts::*;
pub use engine::{InvalidRule, RecurrenceError, generate_between, try_generate_between};
pub use rule::{CodecError, RecurrenceRule, RecurrenceRuleBuilder};
pub use types::{
    EndCondition, EndConditionType, Frequency, ParseError, WeekDay, days_in_year, iso_weeks_in_year,
};
pub use validate::{FieldError, RuleField, validate};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, days_of};

    #[test]
    fn test_stored_column_to_dates() {
        let column = r#"{
            "frequency": "MONTHLY",
            "interval": 1,
            "byWeekDays": ["TU"],
            "bySetPos": [2],
            "anchorDate": "2025-01-01",
            "endCondition": {"type": "COUNT", "count": 3},
            "exDates": ["2025-02-11"]
        }"#;

        let rule = RecurrenceRule::from_json(column).unwrap().unwrap();
        assert_eq!(validate(&rule), Ok(()));
        assert_eq!(
            generate_between(&rule, date(2025, 1, 1), date(2025, 12, 31)),
            vec![date(2025, 1, 14), date(2025, 3, 11)]
        );
    }

    #[test]
    fn test_invalid_values_are_reported_and_skipped() {
        let rule = RecurrenceRule::builder(Frequency::Monthly)
            .anchor(date(2025, 1, 1))
            .by_month_day([15, 40])
            .build();

        let errors = validate(&rule).unwrap_err();
        assert_eq!(errors, vec![FieldError { field: RuleField::ByMonthDay, value: 40 }]);
        assert_eq!(
            generate_between(&rule, date(2025, 3, 1), date(2025, 3, 31)),
            days_of(2025, 3, &[15])
        );
    }

    #[test]
    fn test_blank_column_has_no_rule() {
        assert_eq!(RecurrenceRule::from_json("  ").unwrap(), None);
    }
}
