//! Time handling utilities for climate data.
//!
//! Coordinates on a time axis are stored as plain numbers in CF style units
//! (`"days since 1970-01-01"`). This module converts between those numbers and
//! calendar datetimes, parses the partial datetimes used on the command line
//! and the ISO 8601 periods used as aggregation steps.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CisError, CisResult};

/// Step of a CF time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeStep {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeStep {
    /// Length of one step in seconds.
    pub fn seconds(&self) -> f64 {
        match self {
            TimeStep::Seconds => 1.0,
            TimeStep::Minutes => 60.0,
            TimeStep::Hours => 3600.0,
            TimeStep::Days => 86400.0,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" | "s" => Some(TimeStep::Seconds),
            "minute" | "minutes" | "min" | "mins" => Some(TimeStep::Minutes),
            "hour" | "hours" | "hr" | "hrs" | "h" => Some(TimeStep::Hours),
            "day" | "days" | "d" => Some(TimeStep::Days),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TimeStep::Seconds => "seconds",
            TimeStep::Minutes => "minutes",
            TimeStep::Hours => "hours",
            TimeStep::Days => "days",
        }
    }
}

/// A CF time unit such as `hours since 2000-01-01 00:00:00`.
///
/// Only the standard (proleptic Gregorian) calendar is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeUnit {
    pub step: TimeStep,
    pub reference: NaiveDateTime,
}

impl TimeUnit {
    pub fn new(step: TimeStep, reference: NaiveDateTime) -> Self {
        Self { step, reference }
    }

    /// Parse a unit string of the form `<step> since <reference>`.
    pub fn parse(s: &str) -> CisResult<Self> {
        let (step, reference) = s
            .trim()
            .split_once(" since ")
            .ok_or_else(|| CisError::InvalidTimeUnits(s.to_string()))?;

        let step = TimeStep::from_name(step.trim())
            .ok_or_else(|| CisError::InvalidTimeUnits(s.to_string()))?;

        let reference = PartialDateTime::parse(reference.trim())
            .and_then(|p| p.lower())
            .map_err(|_| CisError::InvalidTimeUnits(s.to_string()))?;

        Ok(Self { step, reference })
    }

    /// Returns true if the string looks like a CF time unit.
    pub fn is_time_unit(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Convert a number in this unit to a datetime.
    pub fn num_to_datetime(&self, value: f64) -> CisResult<NaiveDateTime> {
        let micros = value * self.step.seconds() * 1.0e6;
        if !micros.is_finite() || micros.abs() > i64::MAX as f64 {
            return Err(CisError::DateOutOfRange(format!("{} {}", value, self)));
        }
        self.reference
            .checked_add_signed(Duration::microseconds(micros.round() as i64))
            .ok_or_else(|| CisError::DateOutOfRange(format!("{} {}", value, self)))
    }

    /// Convert a datetime to a number in this unit.
    pub fn datetime_to_num(&self, dt: NaiveDateTime) -> f64 {
        let delta = dt.signed_duration_since(self.reference);
        let whole = delta.num_seconds();
        let nanos = (delta - Duration::seconds(whole))
            .num_nanoseconds()
            .unwrap_or(0);
        (whole as f64 + nanos as f64 * 1.0e-9) / self.step.seconds()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} since {}",
            self.step.name(),
            self.reference.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

impl FromStr for TimeUnit {
    type Err = CisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A datetime given only down to some precision, e.g. `2008-06`.
///
/// Used for the start and end of time aggregation grids. The start of a range
/// is anchored to the beginning of its finest unit and the end to one unit
/// past, so `2008` to `2008` covers the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDateTime {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl PartialDateTime {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
        }
    }

    /// Parse `YYYY[-MM[-DD[Thh[:mm[:ss]]]]]`. A space may replace the `T` and
    /// a trailing `Z` is ignored.
    pub fn parse(s: &str) -> CisResult<Self> {
        let invalid = || CisError::InvalidTime(s.to_string());
        let trimmed = s.trim().trim_end_matches('Z');
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let (date_part, time_part) = match trimmed.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t.trim())),
            None => (trimmed, None),
        };

        let date: Vec<&str> = date_part.split('-').collect();
        if date.len() > 3 || date.iter().any(|c| c.is_empty()) {
            return Err(invalid());
        }
        let year: i32 = date[0].parse().map_err(|_| invalid())?;
        let month = parse_component(date.get(1), s)?;
        let day = parse_component(date.get(2), s)?;

        let (hour, minute, second) = match time_part {
            Some(t) if !t.is_empty() => {
                if day.is_none() {
                    return Err(invalid());
                }
                let time: Vec<&str> = t.split(':').collect();
                if time.len() > 3 {
                    return Err(invalid());
                }
                // Fractional seconds are truncated
                let sec = time.get(2).map(|v| v.split('.').next().unwrap_or(v));
                (
                    parse_component(time.first(), s)?,
                    parse_component(time.get(1), s)?,
                    parse_component(sec.as_ref(), s)?,
                )
            }
            _ => (None, None, None),
        };

        let parsed = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        parsed.lower()?;
        Ok(parsed)
    }

    /// The earliest instant covered by this partial datetime.
    pub fn lower(&self) -> CisResult<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
            .ok_or_else(|| CisError::InvalidTime(self.to_string()))?;
        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )
        .ok_or_else(|| CisError::InvalidTime(self.to_string()))?;
        Ok(NaiveDateTime::new(date, time))
    }

    /// The instant one unit (of the finest given component) past the start.
    pub fn upper_exclusive(&self) -> CisResult<NaiveDateTime> {
        let lower = self.lower()?;
        let out_of_range = || CisError::DateOutOfRange(self.to_string());

        if self.second.is_some() {
            lower.checked_add_signed(Duration::seconds(1)).ok_or_else(out_of_range)
        } else if self.minute.is_some() {
            lower.checked_add_signed(Duration::minutes(1)).ok_or_else(out_of_range)
        } else if self.hour.is_some() {
            lower.checked_add_signed(Duration::hours(1)).ok_or_else(out_of_range)
        } else if self.day.is_some() {
            lower.checked_add_signed(Duration::days(1)).ok_or_else(out_of_range)
        } else if let Some(month) = self.month {
            let (year, month) = month_past_end_of_year(month as i32 + 1, self.year);
            NaiveDate::from_ymd_opt(year, month as u32, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(out_of_range)
        } else {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(out_of_range)
        }
    }
}

fn parse_component(value: Option<&&str>, original: &str) -> CisResult<Option<u32>> {
    match value {
        None => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|_| CisError::InvalidTime(original.to_string())),
    }
}

impl fmt::Display for PartialDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        if let Some(hour) = self.hour {
            write!(f, "T{:02}", hour)?;
            if let Some(minute) = self.minute {
                write!(f, ":{:02}", minute)?;
                if let Some(second) = self.second {
                    write!(f, ":{:02}", second)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for PartialDateTime {
    type Err = CisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for PartialDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self {
            year: dt.year(),
            month: Some(dt.month()),
            day: Some(dt.day()),
            hour: Some(dt.hour()),
            minute: Some(dt.minute()),
            second: Some(dt.second()),
        }
    }
}

/// Normalise a month number past December into the following year(s).
///
/// `month` is 1-based and may exceed 12; month 14 of 2000 is February 2001.
pub fn month_past_end_of_year(month: i32, year: i32) -> (i32, i32) {
    let year = year + (month - 1).div_euclid(12);
    let month = (month - 1).rem_euclid(12) + 1;
    (year, month)
}

/// A calendar period such as one month or one year and six hours.
///
/// Years and months advance by calendar rules, the remaining components are
/// a fixed duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CalendarDelta {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarDelta {
    pub fn years(years: u32) -> Self {
        Self {
            years,
            ..Default::default()
        }
    }

    pub fn months(months: u32) -> Self {
        Self {
            months,
            ..Default::default()
        }
    }

    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Default::default()
        }
    }

    pub fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// The fixed-length part of the period (days and finer).
    pub fn fixed_duration(&self) -> Duration {
        Duration::days(self.days as i64)
            + Duration::hours(self.hours as i64)
            + Duration::minutes(self.minutes as i64)
            + Duration::seconds(self.seconds as i64)
    }

    /// Parse an ISO 8601 duration, e.g. `P1Y`, `P3M`, `P1DT12H`, `PT30M`, `P2W`.
    pub fn parse_iso8601(s: &str) -> CisResult<Self> {
        let invalid = || CisError::InvalidDuration(s.to_string());
        let body = s
            .trim()
            .strip_prefix(['P', 'p'])
            .ok_or_else(invalid)?;

        let mut delta = Self::default();
        let mut in_time = false;
        let mut digits = String::new();
        let mut seen_component = false;

        for c in body.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let c = c.to_ascii_uppercase();
            if c == 'T' {
                if in_time || !digits.is_empty() {
                    return Err(invalid());
                }
                in_time = true;
                continue;
            }
            let value: u32 = digits.parse().map_err(|_| invalid())?;
            digits.clear();
            seen_component = true;
            match (in_time, c) {
                (false, 'Y') => delta.years += value,
                (false, 'M') => delta.months += value,
                (false, 'W') => delta.days += value * 7,
                (false, 'D') => delta.days += value,
                (true, 'H') => delta.hours += value,
                (true, 'M') => delta.minutes += value,
                (true, 'S') => delta.seconds += value,
                _ => return Err(invalid()),
            }
        }

        if !digits.is_empty() || !seen_component {
            return Err(invalid());
        }
        if delta.is_zero() {
            return Err(CisError::InvalidDuration(format!("{} is a zero length period", s)));
        }
        Ok(delta)
    }
}

impl fmt::Display for CalendarDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        if self.is_zero() {
            write!(f, "0D")?;
        }
        Ok(())
    }
}

impl FromStr for CalendarDelta {
    type Err = CisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso8601(s)
    }
}
