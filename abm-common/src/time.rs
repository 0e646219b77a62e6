//! Timestamp and calendar-day utilities
//!
//! Availability works at calendar-day granularity. Anything carrying a time
//! of day is truncated to its date before it reaches a blocked set.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{Error, Result};

/// ISO calendar date format used on the console and in seed files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Years accepted by [`parse_date`]
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's calendar day (UTC)
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Values that can be reduced to a calendar day
pub trait CalendarDay {
    /// The calendar day, time of day discarded
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Parse a `YYYY-MM-DD` date
///
/// Signed or five-digit years are rejected, only [`SUPPORTED_YEARS`] pass.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("Invalid date '{}': {}", s, e)))?;
    if !SUPPORTED_YEARS.contains(&date.year()) || s.starts_with(['+', '-']) {
        return Err(Error::InvalidInput(format!(
            "Invalid date '{}': year must be between {} and {}",
            s,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(date)
}

/// Every calendar day between `a` and `b` inclusive, ascending
///
/// Argument order does not matter.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> Vec<NaiveDate> {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    start.iter_days().take_while(|d| *d <= end).collect()
}
