//! Expansion of a [`RecurrenceRule`] into the dates of an inclusive window.
//!
//! The expansion is a pure function of the rule and the window: no clock,
//! no shared state. Each frequency produces unsorted candidates inside the
//! window; post-processing then sorts them, applies `COUNT`, removes
//! `exDates`, adds in-window `rDates` and deduplicates.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::consts::{DAYS_PER_WEEK, DECEMBER, JANUARY, LAST_SET_POS};
use crate::types::{days_in_year, iso_weeks_in_year};
use crate::{Frequency, RecurrenceRule, WeekDay};

/// Why a rule cannot produce occurrences at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRule {
    /// `interval` is zero
    #[error("Invalid recurrence rule: interval must be at least 1")]
    ZeroInterval,

    /// No anchor date fixes the phase of the series
    #[error("Invalid recurrence rule: anchor date is required")]
    MissingAnchor,
}

/// Error type for [`try_generate_between`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    #[error(transparent)]
    InvalidRule(#[from] InvalidRule),

    /// Window end is before its start.
    #[error("Invalid window: start ({start}) is after end ({end})")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Returns the ascending, duplicate-free dates on which `rule` occurs within
/// `[window_start, window_end]`.
///
/// A malformed rule or an inverted window yields an empty list, exactly like
/// a valid rule without matches. Use [`try_generate_between`] to tell the two
/// apart.
pub fn generate_between(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<NaiveDate> {
    try_generate_between(rule, window_start, window_end).unwrap_or_else(|err| {
        tracing::debug!(%err, "rule produced no occurrences");
        Vec::new()
    })
}

/// Like [`generate_between`], but reports why a rule cannot be expanded.
///
/// A window that lies entirely after an `UNTIL` date is not an error and
/// returns `Ok` with no dates.
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` for a zero interval or a missing
/// anchor, and `RecurrenceError::InvertedWindow` if `window_end < window_start`.
#[tracing::instrument(
    level = "debug",
    skip(rule),
    fields(frequency = %rule.frequency(), end = %rule.end_condition().kind())
)]
pub fn try_generate_between(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<NaiveDate>, RecurrenceError> {
    if rule.interval() < 1 {
        return Err(InvalidRule::ZeroInterval.into());
    }
    if window_end < window_start {
        return Err(RecurrenceError::InvertedWindow {
            start: window_start,
            end:   window_end,
        });
    }
    let anchor = rule.anchor_date().ok_or(InvalidRule::MissingAnchor)?;

    let end_condition = rule.end_condition();
    let effective_end = end_condition
        .until()
        .map_or(window_end, |until| until.min(window_end));
    if effective_end < window_start {
        tracing::debug!(%effective_end, "window starts after the series ends");
        return Ok(Vec::new());
    }

    let count = end_condition.count();
    // COUNT numbers occurrences from the anchor, so expand from there
    let span = Span {
        start: if count.is_some() {
            window_start.min(anchor)
        } else {
            window_start
        },
        end:   effective_end,
    };

    let mut dates = match rule.frequency() {
        Frequency::Secondly | Frequency::Minutely | Frequency::Hourly => {
            expand_sub_daily(rule, anchor, span)
        },
        Frequency::Daily => expand_daily(rule, anchor, span),
        Frequency::Weekly => expand_weekly(rule, anchor, span),
        Frequency::Monthly => expand_monthly(rule, anchor, span),
        Frequency::Yearly => expand_yearly(rule, anchor, span),
    };
    tracing::trace!(candidates = dates.len(), "expanded candidates");

    dates.sort_unstable();
    if let Some(count) = count {
        let limit = usize::try_from(count).unwrap_or(usize::MAX);
        dates = dates
            .into_iter()
            .filter(|d| *d >= anchor)
            .take(limit)
            .filter(|d| *d >= window_start)
            .collect();
    }

    // exDates go after COUNT: excluding a counted date shrinks the series
    // instead of pulling in the next occurrence.
    dates.retain(|d| !rule.ex_dates().contains(d));

    let extra = rule.r_dates().range(window_start..=effective_end).copied();
    let occurrences: BTreeSet<NaiveDate> = dates.into_iter().chain(extra).collect();

    tracing::debug!(occurrences = occurrences.len(), "generated occurrences");
    Ok(occurrences.into_iter().collect())
}

/// Inclusive range of dates candidates are drawn from.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: NaiveDate,
    end:   NaiveDate,
}

impl Span {
    fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Sub-daily frequencies do not tell dates apart, so they expand like
/// `DAILY` and then keep only the requested weekdays.
fn expand_sub_daily(rule: &RecurrenceRule, anchor: NaiveDate, span: Span) -> Vec<NaiveDate> {
    let mut dates = expand_daily(rule, anchor, span);
    let weekdays = rule.by_week_days();
    if !weekdays.is_empty() {
        dates.retain(|d| weekdays.contains(&WeekDay::of(*d)));
    }
    dates
}

fn expand_daily(rule: &RecurrenceRule, anchor: NaiveDate, span: Span) -> Vec<NaiveDate> {
    let interval = u64::from(rule.interval());
    let first = span.start.max(anchor);

    // Align to the next date in phase with the anchor
    let phase = first.signed_duration_since(anchor).num_days().unsigned_abs() % interval;
    let first = if phase == 0 {
        Some(first)
    } else {
        first.checked_add_days(Days::new(interval - phase))
    };

    std::iter::successors(first, |d| d.checked_add_days(Days::new(interval)))
        .take_while(|d| *d <= span.end)
        .filter(|d| matches_year_filters(rule, *d))
        .collect()
}

fn expand_weekly(rule: &RecurrenceRule, anchor: NaiveDate, span: Span) -> Vec<NaiveDate> {
    let interval = i64::from(rule.interval());
    let weekdays = if rule.by_week_days().is_empty() {
        BTreeSet::from([WeekDay::of(anchor)])
    } else {
        rule.by_week_days().clone()
    };
    let week_start: Weekday = rule.week_start().into();
    let anchor_week = anchor.week(week_start).first_day();

    // Nothing before the anchor can match
    span.start
        .max(anchor)
        .iter_days()
        .take_while(|d| *d <= span.end)
        .filter(|d| {
            let weeks = d
                .week(week_start)
                .first_day()
                .signed_duration_since(anchor_week)
                .num_days()
                / DAYS_PER_WEEK;
            weeks % interval == 0 && weekdays.contains(&WeekDay::of(*d))
        })
        .filter(|d| matches_year_filters(rule, *d))
        .collect()
}

fn expand_monthly(rule: &RecurrenceRule, anchor: NaiveDate, span: Span) -> Vec<NaiveDate> {
    let interval = i64::from(rule.interval());
    let anchor_month = month_index(anchor);

    let mut out = Vec::new();
    for index in month_index(span.start)..=month_index(span.end) {
        let offset = index - anchor_month;
        if offset < 0 || offset % interval != 0 {
            continue;
        }
        let Some((year, month)) = year_month(index) else {
            continue;
        };
        out.extend(
            select_in_month(rule, anchor, year, month)
                .into_iter()
                .filter(|d| span.contains(*d) && *d >= anchor),
        );
    }
    out.retain(|d| matches_year_filters(rule, *d));
    out
}

fn expand_yearly(rule: &RecurrenceRule, anchor: NaiveDate, span: Span) -> Vec<NaiveDate> {
    let interval = i64::from(rule.interval());
    let months: Vec<u32> = if rule.by_month().is_empty() {
        vec![anchor.month()]
    } else {
        rule.by_month()
            .iter()
            .filter_map(|&m| u32::try_from(m).ok())
            .filter(|m| (JANUARY..=DECEMBER).contains(m))
            .collect()
    };

    let mut out = Vec::new();
    for year in span.start.year()..=span.end.year() {
        let offset = i64::from(year) - i64::from(anchor.year());
        if offset < 0 || offset % interval != 0 {
            continue;
        }
        for &month in &months {
            out.extend(
                select_in_month(rule, anchor, year, month)
                    .into_iter()
                    .filter(|d| span.contains(*d) && *d >= anchor),
            );
        }
    }
    out.retain(|d| matches_year_filters(rule, *d));
    out
}

/// Dates a qualifying month contributes: `byMonthDay` days that exist in the
/// month, plus `byWeekDays` occurrences (narrowed by `bySetPos` when given).
/// With neither selector the anchor's day of month is used.
fn select_in_month(rule: &RecurrenceRule, anchor: NaiveDate, year: i32, month: u32) -> Vec<NaiveDate> {
    let month_days = rule.by_month_day();
    let weekdays = rule.by_week_days();
    let positions = rule.by_set_pos();

    // Days past the end of the month are skipped, never rolled over
    let mut out: Vec<NaiveDate> = month_days
        .iter()
        .filter_map(|&day| u32::try_from(day).ok())
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect();

    for &weekday in weekdays {
        let candidates = weekday_dates_in_month(year, month, weekday);
        if positions.is_empty() {
            out.extend(candidates);
        } else {
            out.extend(positions.iter().filter_map(|&pos| pick_by_set_pos(&candidates, pos)));
        }
    }

    if month_days.is_empty() && weekdays.is_empty() {
        out.extend(NaiveDate::from_ymd_opt(year, month, anchor.day()));
    }
    out
}

/// Every date in the month falling on `weekday`, in order.
fn weekday_dates_in_month(year: i32, month: u32, weekday: WeekDay) -> Vec<NaiveDate> {
    (1..=5)
        .map_while(|n| NaiveDate::from_weekday_of_month_opt(year, month, weekday.into(), n))
        .collect()
}

/// 1-based position from the start, or the last candidate for `-1`.
/// Positions past the available candidates select nothing.
fn pick_by_set_pos(candidates: &[NaiveDate], pos: i32) -> Option<NaiveDate> {
    if pos == LAST_SET_POS {
        return candidates.last().copied();
    }
    let index = usize::try_from(pos).ok()?.checked_sub(1)?;
    candidates.get(index).copied()
}

/// `byWeekNo` and `byYearDay` filters; an empty set lets every date through.
fn matches_year_filters(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    let week_nos = rule.by_week_no();
    if !week_nos.is_empty() {
        let iso = date.iso_week();
        let total = iso_weeks_in_year(iso.year());
        if !week_nos.iter().any(|&n| matches_ordinal(n, iso.week(), total)) {
            return false;
        }
    }

    let year_days = rule.by_year_day();
    if !year_days.is_empty() {
        let total = days_in_year(date.year());
        if !year_days.iter().any(|&n| matches_ordinal(n, date.ordinal(), total)) {
            return false;
        }
    }

    true
}

/// Positive `n` counts from 1 at the start; negative `n` counts back from `total`.
fn matches_ordinal(n: i32, actual: u32, total: u32) -> bool {
    let actual = i64::from(actual);
    match i64::from(n) {
        0 => false,
        n if n > 0 => n == actual,
        n => i64::from(total) + n + 1 == actual,
    }
}

/// Months since year 0, so month differences are plain subtraction
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn year_month(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}
