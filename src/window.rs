//! The reconciliation time window, parsed from YYYY[-MM][-DD] date strings.
//!
//! One value covers that whole period (a bare year runs January 1st through
//! December 31st); two values run from the start of the first period to the
//! end of the second. Bounds are inclusive at minute precision.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ReconcileError;

/// Timestamp format shared by feed exports, snapshots, and report names.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// A date value must be the whole string; a stray "2021-3" is an error, not
/// a year-wide window.
static DATE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(-(\d{2}))?(-(\d{2}))?$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Window {
    /// Parse one or two date values into an inclusive window.
    pub fn parse(values: &[String]) -> Result<Self, ReconcileError> {
        match values {
            [single] => {
                let part = DatePart::parse(single)?;
                Ok(Window {
                    from: part.period_start(single)?,
                    to: part.period_end(single)?,
                })
            }
            [first, last] => Ok(Window {
                from: DatePart::parse(first)?.period_start(first)?,
                to: DatePart::parse(last)?.period_end(last)?,
            }),
            _ => Err(malformed(&values.join(" "))),
        }
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.from <= t && t <= self.to
    }
}

/// One parsed date value, before period expansion.
struct DatePart {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl DatePart {
    fn parse(s: &str) -> Result<Self, ReconcileError> {
        let caps = DATE_PART.captures(s.trim()).ok_or_else(|| malformed(s))?;
        let year = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| malformed(s))?;
        let month = caps.get(3).and_then(|m| m.as_str().parse().ok());
        let day = caps.get(5).and_then(|m| m.as_str().parse().ok());
        Ok(DatePart { year, month, day })
    }

    /// Missing parts snap to the earliest moment of the period.
    fn period_start(&self, input: &str) -> Result<NaiveDateTime, ReconcileError> {
        datetime(
            self.year,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
            0,
            0,
            input,
        )
    }

    /// Missing parts snap to the latest moment of the period.
    fn period_end(&self, input: &str) -> Result<NaiveDateTime, ReconcileError> {
        match (self.month, self.day) {
            (None, _) => datetime(self.year, 12, 31, 23, 59, input),
            (Some(month), None) => {
                let day = last_day_of_month(self.year, month);
                datetime(self.year, month, day, 23, 59, input)
            }
            (Some(month), Some(day)) => datetime(self.year, month, day, 23, 59, input),
        }
    }
}

fn datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    input: &str,
) -> Result<NaiveDateTime, ReconcileError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| malformed(input))
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(28)
}

fn malformed(input: &str) -> ReconcileError {
    ReconcileError::MalformedDateRange {
        input: input.to_string(),
    }
}
