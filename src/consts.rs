/// Interval used when a rule does not specify one
pub const DEFAULT_INTERVAL: u32 = 1;

/// Number of days in a week, used for week-phase arithmetic
pub const DAYS_PER_WEEK: i64 = 7;

/// Valid `byHour` values (inclusive)
pub const MIN_HOUR: i32 = 0;
pub const MAX_HOUR: i32 = 23;

/// Valid `byMinute` values (inclusive)
pub const MIN_MINUTE: i32 = 0;
pub const MAX_MINUTE: i32 = 59;

/// Valid `bySecond` values (inclusive), 60 allows for a leap second
pub const MIN_SECOND: i32 = 0;
pub const MAX_SECOND: i32 = 60;

/// Largest ISO week number; `byWeekNo` accepts `±1..=MAX_WEEK_NO`
pub const MAX_WEEK_NO: i32 = 53;

/// Largest day of a leap year; `byYearDay` accepts `±1..=MAX_YEAR_DAY`
pub const MAX_YEAR_DAY: i32 = 366;

/// Valid `byMonth` values (inclusive)
pub const MIN_MONTH: i32 = 1;
pub const MAX_MONTH: i32 = 12;

/// Month number for January
pub const JANUARY: u32 = 1;
/// Month number for December
pub const DECEMBER: u32 = 12;

/// Largest day of any month; `byMonthDay` accepts `1..=MAX_MONTH_DAY`
pub const MAX_MONTH_DAY: i32 = 31;

/// Largest positive `bySetPos` (a weekday occurs at most five times a month)
pub const MAX_SET_POS: i32 = 5;
/// `bySetPos` value selecting the last matching weekday of a month
pub const LAST_SET_POS: i32 = -1;

/// Days in a common year
pub const DAYS_IN_COMMON_YEAR: u32 = 365;
/// Days in a leap year
pub const DAYS_IN_LEAP_YEAR: u32 = 366;

/// December 28th always falls in the last ISO week of its year
pub(crate) const LAST_ISO_WEEK_DAY: u32 = 28;
