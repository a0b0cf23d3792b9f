//! Calendar arithmetic for Monday-start weeks.
//!
//! Dates are plain calendar dates (`NaiveDate`): no time of day, no
//! timezone, no daylight-saving adjustments.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

/// Day labels indexed by day-of-week slot (Monday = 0).
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(offset))
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

pub fn add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    add_days(date, weeks * 7)
}

/// Whole weeks from the week containing `from` to the week containing `to`.
/// Negative when `to` lies in an earlier week.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let days = (week_start(to) - week_start(from)).num_days();
    days.div_euclid(7)
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn from_iso_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
        .map_err(|_| CalendarError::InvalidDate(value.to_string()))
}

/// Label such as "Feb 9 - Feb 15" for the week starting at `week_start`.
pub fn format_week_range(week_start: NaiveDate) -> String {
    let week_end = add_days(week_start, 6);
    format!("{} - {}", short_label(week_start), short_label(week_end))
}

/// Label such as "Feb 9".
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

pub fn day_name(day_index: u8) -> Option<&'static str> {
    DAY_NAMES.get(usize::from(day_index)).copied()
}
