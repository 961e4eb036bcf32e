//! Date type for dated series entries.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{CadenceError, CadenceResult};

/// A calendar date keying series entries.
///
/// Newtype over `chrono::NaiveDate`. Ordering is chronological, which is
/// the ordering every series relies on.
///
/// # Example
///
/// ```rust
/// use cadence_core::types::Date;
///
/// let date = Date::from_ymd(2025, 1, 31).unwrap();
/// let next = date.add_months(1).unwrap();
/// assert_eq!(next, Date::from_ymd(2025, 2, 28).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CadenceError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CadenceResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CadenceError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `CadenceError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CadenceResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CadenceError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Adds a number of months, clamping to the last day of the target month.
    ///
    /// # Errors
    ///
    /// Returns `CadenceError::InvalidDate` if the result is out of range.
    pub fn add_months(&self, months: i32) -> CadenceResult<Self> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| CadenceError::invalid_date(format!("{self} shifted by {months} months")))
    }

    /// Calculates the number of calendar days from `self` to `other`.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Add<i64> for Date {
    type Output = Self;

    fn add(self, days: i64) -> Self::Output {
        self.add_days(days)
    }
}

impl Sub<i64> for Date {
    type Output = Self;

    fn sub(self, days: i64) -> Self::Output {
        self.add_days(-days)
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}
