//! Date and time helpers shared by outer layers.
//!
//! # Responsibility
//! - Provide date arithmetic (diffs, day bounds, add days/years).
//! - Format and parse dates in the `dd/MM/yyyy` family of patterns.
//!
//! # Invariants
//! - Parsing failures are logged and surfaced, never masked as defaults.
//! - All arithmetic is calendar-naive; time zone handling belongs to callers.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, ParseError};
use log::warn;

const MILLISECONDS_PER_SECOND: i64 = 1000;
const MILLISECONDS_PER_MINUTE: i64 = MILLISECONDS_PER_SECOND * 60;
const MILLISECONDS_PER_HOUR: i64 = MILLISECONDS_PER_MINUTE * 60;
const MILLISECONDS_PER_DAY: i64 = MILLISECONDS_PER_HOUR * 24;
const MILLISECONDS_PER_MONTH: i64 = MILLISECONDS_PER_DAY * 30;

/// Day/month/year, e.g. `31/08/2026`.
pub const PATTERN_DAY_MONTH_YEAR: &str = "%d/%m/%Y";
/// Time of day, e.g. `14:05:09`.
pub const PATTERN_TIME: &str = "%H:%M:%S";
/// Day/month/year plus time, e.g. `31/08/2026 14:05:09`.
pub const PATTERN_DAY_MONTH_YEAR_TIME: &str = "%d/%m/%Y %H:%M:%S";

/// Difference `end - begin` in whole milliseconds.
pub fn diff_in_milliseconds(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    (end - begin).num_milliseconds()
}

/// Difference `end - begin` in whole seconds.
pub fn diff_in_seconds(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    diff_in_milliseconds(end, begin) / MILLISECONDS_PER_SECOND
}

/// Difference `end - begin` in whole minutes.
pub fn diff_in_minutes(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    diff_in_milliseconds(end, begin) / MILLISECONDS_PER_MINUTE
}

/// Difference `end - begin` in whole hours.
pub fn diff_in_hours(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    diff_in_milliseconds(end, begin) / MILLISECONDS_PER_HOUR
}

/// Difference `end - begin` in whole days.
pub fn diff_in_days(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    diff_in_milliseconds(end, begin) / MILLISECONDS_PER_DAY
}

/// Difference `end - begin` in 30-day months.
pub fn diff_in_months(end: NaiveDateTime, begin: NaiveDateTime) -> i64 {
    diff_in_milliseconds(end, begin) / MILLISECONDS_PER_MONTH
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar year of the date.
pub fn year(date: NaiveDate) -> i32 {
    date.year()
}

/// Current local calendar year.
pub fn current_year() -> i32 {
    year(today())
}

/// Calendar month of the date, 1-based (January is 1).
pub fn month(date: NaiveDate) -> u32 {
    date.month()
}

/// Current local calendar month, 1-based.
pub fn current_month() -> u32 {
    month(today())
}

/// Full English month name of the date.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// Full English name of the current local month.
pub fn current_month_name() -> String {
    month_name(today())
}

/// Formats a date as `dd/MM/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    format_date_with(date, PATTERN_DAY_MONTH_YEAR)
}

/// Formats a date with an explicit pattern.
pub fn format_date_with(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}

/// Formats a date-time as `dd/MM/yyyy HH:mm:ss`.
pub fn format_date_time(moment: NaiveDateTime) -> String {
    moment.format(PATTERN_DAY_MONTH_YEAR_TIME).to_string()
}

/// Parses a `dd/MM/yyyy` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    parse_date_with(value, PATTERN_DAY_MONTH_YEAR)
}

/// Parses a date with an explicit pattern.
///
/// Failures are logged with the offending input, then returned.
pub fn parse_date_with(value: &str, pattern: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, pattern).map_err(|err| {
        warn!("event=date_parse module=dates status=error value={value} pattern={pattern} error={err}");
        err
    })
}

/// Same calendar day at `00:00:00.000`.
pub fn start_of_day(moment: NaiveDateTime) -> NaiveDateTime {
    moment.date().and_time(NaiveTime::MIN)
}

/// Same calendar day at `23:59:59.999`.
pub fn end_of_day(moment: NaiveDateTime) -> NaiveDateTime {
    match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
        Some(time) => moment.date().and_time(time),
        None => moment,
    }
}

/// Adds (or subtracts, when negative) calendar days.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Adds calendar years, clamping Feb 29 to Feb 28 on non-leap targets.
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(date)
}

/// Whether both moments fall on the same calendar day.
pub fn is_same_day(first: NaiveDateTime, second: NaiveDateTime) -> bool {
    first.date() == second.date()
}

/// Whether the date lies strictly after today's local date.
pub fn is_after_today(date: NaiveDate) -> bool {
    date > today()
}

/// Whether the end moment lies strictly before the start moment.
pub fn is_end_before_start(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    end < start
}
