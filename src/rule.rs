use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{DEFAULT_INTERVAL, EndCondition, Frequency, WeekDay};

/// An immutable description of one recurring series.
///
/// Field names on the wire follow the camelCase JSON contract shared with
/// the API and persistence layers (`byWeekDays`, `anchorDate`, `rDates`, ...).
/// Missing fields take their defaults; explicit `null` sets read as empty.
///
/// Numeric BY-values are kept as `i32` without range checks so that a
/// malformed payload still deserializes and can be reported field by field
/// through [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    frequency:     Frequency,
    #[serde(default = "default_interval", deserialize_with = "nullable")]
    interval:      u32,
    #[serde(default, deserialize_with = "nullable")]
    by_week_days:  BTreeSet<WeekDay>,
    #[serde(default, deserialize_with = "nullable")]
    by_month_day:  BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_set_pos:    BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_month:      BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_hour:       BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_minute:     BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_second:     BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_week_no:    BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    by_year_day:   BTreeSet<i32>,
    #[serde(default, deserialize_with = "nullable")]
    week_start:    WeekDay,
    #[serde(default, deserialize_with = "nullable")]
    end_condition: EndCondition,
    #[serde(default, deserialize_with = "nullable")]
    ex_dates:      BTreeSet<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    r_dates:       BTreeSet<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timezone:      Option<String>,
    #[serde(default)]
    anchor_date:   Option<NaiveDate>,
}

const fn default_interval() -> u32 {
    DEFAULT_INTERVAL
}

/// Reads an explicit `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error raised by the JSON persistence codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to serialize recurrence rule to JSON")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to deserialize recurrence rule from JSON")]
    Deserialize(#[source] serde_json::Error),
}

impl RecurrenceRule {
    /// Starts a rule with the given frequency and every other field at its default
    pub fn builder(frequency: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            rule: Self {
                frequency,
                interval: DEFAULT_INTERVAL,
                by_week_days: BTreeSet::new(),
                by_month_day: BTreeSet::new(),
                by_set_pos: BTreeSet::new(),
                by_month: BTreeSet::new(),
                by_hour: BTreeSet::new(),
                by_minute: BTreeSet::new(),
                by_second: BTreeSet::new(),
                by_week_no: BTreeSet::new(),
                by_year_day: BTreeSet::new(),
                week_start: WeekDay::Monday,
                end_condition: EndCondition::Never,
                ex_dates: BTreeSet::new(),
                r_dates: BTreeSet::new(),
                timezone: None,
                anchor_date: None,
            },
        }
    }

    /// Returns a builder seeded with a copy of this rule, for deriving a variant
    pub fn to_builder(&self) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder { rule: self.clone() }
    }

    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Every `interval` units of [`Self::frequency`]; zero makes the rule non-generative
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Reference date fixing the phase of the series
    pub const fn anchor_date(&self) -> Option<NaiveDate> {
        self.anchor_date
    }

    pub const fn by_week_days(&self) -> &BTreeSet<WeekDay> {
        &self.by_week_days
    }

    pub const fn by_month_day(&self) -> &BTreeSet<i32> {
        &self.by_month_day
    }

    pub const fn by_set_pos(&self) -> &BTreeSet<i32> {
        &self.by_set_pos
    }

    pub const fn by_month(&self) -> &BTreeSet<i32> {
        &self.by_month
    }

    pub const fn by_hour(&self) -> &BTreeSet<i32> {
        &self.by_hour
    }

    pub const fn by_minute(&self) -> &BTreeSet<i32> {
        &self.by_minute
    }

    pub const fn by_second(&self) -> &BTreeSet<i32> {
        &self.by_second
    }

    pub const fn by_week_no(&self) -> &BTreeSet<i32> {
        &self.by_week_no
    }

    pub const fn by_year_day(&self) -> &BTreeSet<i32> {
        &self.by_year_day
    }

    pub const fn week_start(&self) -> WeekDay {
        self.week_start
    }

    pub const fn end_condition(&self) -> EndCondition {
        self.end_condition
    }

    pub const fn ex_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.ex_dates
    }

    pub const fn r_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.r_dates
    }

    /// IANA timezone name; carried for callers, never used in date arithmetic
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Encodes the rule for storage in a single text column.
    ///
    /// # Errors
    /// Returns `CodecError::Serialize` if JSON encoding fails.
    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Serialize)
    }

    /// Decodes a rule from a stored text column. A blank column holds no rule.
    ///
    /// # Errors
    /// Returns `CodecError::Deserialize` if the column is not a valid rule.
    pub fn from_json(column: &str) -> Result<Option<Self>, CodecError> {
        if column.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(column)
            .map(Some)
            .map_err(CodecError::Deserialize)
    }
}

/// Builder for [`RecurrenceRule`]; every setter consumes and returns the builder.
#[derive(Debug, Clone)]
#[must_use]
pub struct RecurrenceRuleBuilder {
    rule: RecurrenceRule,
}

impl RecurrenceRuleBuilder {
    pub fn interval(mut self, interval: u32) -> Self {
        self.rule.interval = interval;
        self
    }

    pub fn anchor(mut self, anchor: NaiveDate) -> Self {
        self.rule.anchor_date = Some(anchor);
        self
    }

    pub fn by_week_days(mut self, days: impl IntoIterator<Item = WeekDay>) -> Self {
        self.rule.by_week_days = days.into_iter().collect();
        self
    }

    pub fn by_month_day(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_month_day = days.into_iter().collect();
        self
    }

    pub fn by_set_pos(mut self, positions: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_set_pos = positions.into_iter().collect();
        self
    }

    pub fn by_month(mut self, months: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_month = months.into_iter().collect();
        self
    }

    pub fn by_hour(mut self, hours: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_hour = hours.into_iter().collect();
        self
    }

    pub fn by_minute(mut self, minutes: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_minute = minutes.into_iter().collect();
        self
    }

    pub fn by_second(mut self, seconds: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_second = seconds.into_iter().collect();
        self
    }

    pub fn by_week_no(mut self, weeks: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_week_no = weeks.into_iter().collect();
        self
    }

    pub fn by_year_day(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.rule.by_year_day = days.into_iter().collect();
        self
    }

    pub fn week_start(mut self, day: WeekDay) -> Self {
        self.rule.week_start = day;
        self
    }

    pub fn end_condition(mut self, end: EndCondition) -> Self {
        self.rule.end_condition = end;
        self
    }

    /// Shorthand for `end_condition(EndCondition::Until { until })`
    pub fn until(self, until: NaiveDate) -> Self {
        self.end_condition(EndCondition::Until { until })
    }

    /// Shorthand for `end_condition(EndCondition::Count { count })`
    pub fn count(self, count: u32) -> Self {
        self.end_condition(EndCondition::Count { count })
    }

    pub fn ex_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.rule.ex_dates = dates.into_iter().collect();
        self
    }

    pub fn r_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.rule.r_dates = dates.into_iter().collect();
        self
    }

    pub fn timezone(mut self, tz: impl Into<String>) -> Self {
        self.rule.timezone = Some(tz.into());
        self
    }

    pub fn build(self) -> RecurrenceRule {
        self.rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_builder_defaults() {
        let rule = RecurrenceRule::builder(Frequency::Daily).build();

        assert_eq!(rule.frequency(), Frequency::Daily);
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.anchor_date(), None);
        assert_eq!(rule.week_start(), WeekDay::Monday);
        assert_eq!(rule.end_condition(), EndCondition::Never);
        assert!(rule.by_week_days().is_empty());
        assert!(rule.ex_dates().is_empty());
        assert_eq!(rule.timezone(), None);
    }

    #[test]
    fn test_builder_sets_fields() {
        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .interval(2)
            .anchor(date(2025, 1, 6))
            .by_hour([9, 17, 9])
            .by_minute([0, 30])
            .week_start(WeekDay::Sunday)
            .count(4)
            .timezone("Asia/Seoul")
            .build();

        assert_eq!(rule.interval(), 2);
        assert_eq!(rule.anchor_date(), Some(date(2025, 1, 6)));
        assert_eq!(rule.by_hour(), &BTreeSet::from([9, 17]));
        assert_eq!(rule.by_minute(), &BTreeSet::from([0, 30]));
        assert_eq!(rule.week_start(), WeekDay::Sunday);
        assert_eq!(rule.end_condition(), EndCondition::Count { count: 4 });
        assert_eq!(rule.timezone(), Some("Asia/Seoul"));
    }

    #[test]
    fn test_to_builder_leaves_original_untouched() {
        let base = RecurrenceRule::builder(Frequency::Daily).anchor(date(2025, 1, 1)).build();
        let variant = base.to_builder().ex_dates([date(2025, 1, 3)]).build();

        assert!(base.ex_dates().is_empty());
        assert_eq!(variant.ex_dates(), &BTreeSet::from([date(2025, 1, 3)]));
        assert_eq!(variant.anchor_date(), base.anchor_date());
    }

    #[test]
    fn test_serialize_uses_contract_field_names() {
        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .interval(2)
            .by_hour([9, 14, 18])
            .by_week_no([1, 26, 52])
            .by_year_day([1, 100, 365])
            .r_dates([date(2025, 6, 22)])
            .anchor(date(2025, 1, 1))
            .timezone("Asia/Seoul")
            .build();

        let json = rule.to_json().unwrap();
        for field in [
            r#""frequency":"HOURLY""#,
            r#""byHour":[9,14,18]"#,
            r#""byWeekNo":[1,26,52]"#,
            r#""byYearDay":[1,100,365]"#,
            r#""weekStart":"MO""#,
            r#""endCondition":{"type":"NEVER"}"#,
            r#""rDates":["2025-06-22"]"#,
            r#""exDates":[]"#,
            r#""anchorDate":"2025-01-01""#,
            r#""timezone":"Asia/Seoul""#,
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn test_deserialize_full_payload() {
        let json = r#"
            {
                "frequency": "MINUTELY",
                "interval": 15,
                "byWeekDays": ["MO", "FR"],
                "byHour": [9, 17],
                "byMinute": [0, 15, 30, 45],
                "bySecond": [0, 30],
                "byWeekNo": [1, -1],
                "byYearDay": [100, -100],
                "weekStart": "SU",
                "endCondition": {"type": "UNTIL", "until": "2025-12-31"},
                "exDates": ["2025-06-15"],
                "rDates": ["2025-06-22"],
                "timezone": "Asia/Seoul",
                "anchorDate": "2025-01-01"
            }
        "#;

        let rule = RecurrenceRule::from_json(json).unwrap().unwrap();
        assert_eq!(rule.frequency(), Frequency::Minutely);
        assert_eq!(rule.interval(), 15);
        assert_eq!(rule.by_week_days(), &BTreeSet::from([WeekDay::Monday, WeekDay::Friday]));
        assert_eq!(rule.by_hour(), &BTreeSet::from([9, 17]));
        assert_eq!(rule.by_second(), &BTreeSet::from([0, 30]));
        assert_eq!(rule.by_week_no(), &BTreeSet::from([1, -1]));
        assert_eq!(rule.by_year_day(), &BTreeSet::from([100, -100]));
        assert_eq!(rule.week_start(), WeekDay::Sunday);
        assert_eq!(rule.end_condition().until(), Some(date(2025, 12, 31)));
        assert_eq!(rule.ex_dates(), &BTreeSet::from([date(2025, 6, 15)]));
        assert_eq!(rule.r_dates(), &BTreeSet::from([date(2025, 6, 22)]));
        assert_eq!(rule.timezone(), Some("Asia/Seoul"));
        assert_eq!(rule.anchor_date(), Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_deserialize_minimal_payload_takes_defaults() {
        let rule = RecurrenceRule::from_json(r#"{"frequency":"DAILY"}"#).unwrap().unwrap();
        assert_eq!(rule, RecurrenceRule::builder(Frequency::Daily).build());
    }

    #[test]
    fn test_deserialize_nulls() {
        let json = r#"{
            "frequency": "WEEKLY",
            "interval": null,
            "byWeekDays": null,
            "byMonthDay": null,
            "weekStart": null,
            "endCondition": null,
            "exDates": null,
            "timezone": null,
            "anchorDate": null
        }"#;

        let rule = RecurrenceRule::from_json(json).unwrap().unwrap();
        // A null interval is not the same as a missing one: it leaves the rule non-generative
        assert_eq!(rule.interval(), 0);
        assert!(rule.by_week_days().is_empty());
        assert_eq!(rule.week_start(), WeekDay::Monday);
        assert_eq!(rule.end_condition(), EndCondition::Never);
        assert_eq!(rule.anchor_date(), None);
    }

    #[test]
    fn test_out_of_range_values_survive_deserialization() {
        let rule = RecurrenceRule::from_json(r#"{"frequency":"HOURLY","byHour":[24, 9]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(rule.by_hour(), &BTreeSet::from([9, 24]));
    }

    #[test]
    fn test_from_json_blank_column() {
        assert!(RecurrenceRule::from_json("").unwrap().is_none());
        assert!(RecurrenceRule::from_json("   \n").unwrap().is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = RecurrenceRule::from_json("{not json");
        assert!(matches!(result, Err(CodecError::Deserialize(_))));

        let result = RecurrenceRule::from_json(r#"{"frequency":"FORTNIGHTLY"}"#);
        assert!(matches!(result, Err(CodecError::Deserialize(_))));

        let result = RecurrenceRule::from_json(r#"{"interval":2}"#);
        assert!(result.is_err(), "frequency is required");
    }

    #[test]
    fn test_json_round_trip() {
        let original = RecurrenceRule::builder(Frequency::Secondly)
            .interval(30)
            .by_hour([8, 12, 16, 20])
            .by_second([0])
            .by_week_no([1, 13, 26, 39, 52])
            .until(date(2026, 1, 1))
            .timezone("UTC")
            .anchor(date(2025, 1, 1))
            .build();

        let json = original.to_json().unwrap();
        let restored = RecurrenceRule::from_json(&json).unwrap().unwrap();
        assert_eq!(original, restored);
    }
}
