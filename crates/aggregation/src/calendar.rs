//! Calendar period arithmetic for time aggregation grids.
//!
//! Grid cells on a time axis are centred on the middle of each period. The
//! middle of a period is approximated: half a year is six months, half a
//! month is fourteen days, and the fixed part of the period contributes
//! half of `(days - 1, hours, minutes, seconds)`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use cis_common::time::month_past_end_of_year;
use cis_common::{CalendarDelta, CisError, CisResult};

/// Skip applied when adding months lands on a day the month does not have.
pub const INVALID_DATE_SKIP_DAYS: i64 = 28;

/// Shift applied for any month component when centring a period.
pub const HALF_MONTH_DAYS: i64 = 14;

/// Move `dt` forward by half of `years`.
///
/// Whole pairs of years advance the year; an odd year adds six months,
/// rolling into the next year past December.
pub fn add_year_midpoint(dt: NaiveDateTime, years: u32) -> CisResult<NaiveDateTime> {
    let month = dt.month() as i32 + 6 * (years % 2) as i32;
    let year = dt.year() + (years / 2) as i32;
    let (year, month) = month_past_end_of_year(month, year);
    with_year_month(dt, year, month).ok_or_else(|| {
        CisError::DateOutOfRange(format!(
            "{} shifted by half of {} years",
            dt.format("%Y-%m-%d %H:%M:%S"),
            years
        ))
    })
}

/// The first grid point of a calendar grid starting at `start`.
pub fn half_period_start(start: NaiveDateTime, delta: &CalendarDelta) -> CisResult<NaiveDateTime> {
    let mut dt = start;

    if delta.years > 0 {
        dt = add_year_midpoint(dt, delta.years)?;
    }

    if delta.months > 0 {
        dt = checked_add(dt, Duration::days(HALF_MONTH_DAYS))?;
    }

    let remainder = Duration::days(delta.days as i64 - 1)
        + Duration::hours(delta.hours as i64)
        + Duration::minutes(delta.minutes as i64)
        + Duration::seconds(delta.seconds as i64);
    checked_add(dt, remainder / 2)
}

/// Advance `dt` by one period.
///
/// Years and months are added to the calendar date. If the resulting date
/// does not exist (the 30th of February) the date is instead moved forward
/// by 28 days. The fixed-length part of the period is then added.
pub fn advance_period(dt: NaiveDateTime, delta: &CalendarDelta) -> CisResult<NaiveDateTime> {
    let (year, month) = month_past_end_of_year(
        dt.month() as i32 + delta.months as i32,
        dt.year() + delta.years as i32,
    );

    let shifted = match with_year_month(dt, year, month) {
        Some(shifted) => shifted,
        None => checked_add(dt, Duration::days(INVALID_DATE_SKIP_DAYS))?,
    };

    checked_add(shifted, delta.fixed_duration())
}

fn with_year_month(dt: NaiveDateTime, year: i32, month: i32) -> Option<NaiveDateTime> {
    let month = u32::try_from(month).ok()?;
    NaiveDate::from_ymd_opt(year, month, dt.day()).map(|date| date.and_time(dt.time()))
}

fn checked_add(dt: NaiveDateTime, duration: Duration) -> CisResult<NaiveDateTime> {
    dt.checked_add_signed(duration)
        .ok_or_else(|| CisError::DateOutOfRange(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
}
