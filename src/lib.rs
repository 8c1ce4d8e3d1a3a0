//! Conversion between proleptic Gregorian calendar dates and Julian Dates
//! over an unrestricted year range, including year zero and negative years.
//!
//! Two independent strategies implement the same [`CalendarConverter`] contract:
//! [`CycleDecomposition`] and [`UnifiedRecurrence`]. [`ReferenceConverter`] is the
//! classic restricted-domain algorithm they are cross-checked against, and
//! [`harness`] drives all three over published tables and whole-year sweeps.

mod config;
mod consts;
mod converter;
mod cycle;
pub mod harness;
mod julian;
mod prelude;
mod recurrence;
mod reference;
mod types;

pub use config::ConverterConfig;
pub use consts::*;
pub use converter::CalendarConverter;
pub use cycle::CycleDecomposition;
pub use julian::{JulianDate, SplitDay};
pub use recurrence::UnifiedRecurrence;
pub use reference::ReferenceConverter;
pub use types::{
    Day, Month, days_from_jan0, days_in_complete_years, days_in_month, days_until_dec32, is_leap_year,
    month_length, year_length,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A proleptic Gregorian calendar date with a fraction of the day.
///
/// Years use astronomical numbering: 1 BC is year 0, 2 BC is year -1.
/// Ordering is lexicographic over year, month, day and fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CalendarDate {
    year:     i32,
    month:    Month,
    day:      Day,
    fraction: f64,
}

/// Error type for calendar and Julian Date conversions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Month outside 1..=12.
    #[error("Invalid month: {0} (must be 1-12)")]
    InvalidMonth(u8),

    /// Day that does not exist in its month.
    #[error("Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: i32, month: u8, day: u8 },

    /// Day outside 1..=31, checked without a year and month.
    #[error("Invalid day: {0} (must be 1-31)")]
    DayOutOfBounds(u8),

    /// Day fraction outside `[0, 1)`.
    #[error("Invalid day fraction: {0} (must be in [0, 1))")]
    InvalidFraction(f64),

    /// Julian Date outside the accepted window.
    #[error("Julian Date {jd} is outside the accepted range [{min}, {max}]")]
    OutOfRange { jd: f64, min: f64, max: f64 },

    /// Calendar year before the earliest year a restricted converter accepts.
    #[error("Year {year} is before the earliest supported year {earliest}")]
    DateTooEarly { year: i32, earliest: i32 },

    /// Malformed text form of a calendar date.
    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    /// Unusable converter configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CalendarDate {
    /// Creates a validated calendar date.
    ///
    /// # Errors
    /// Returns `InvalidMonth`, `InvalidDay` or `InvalidFraction` for components
    /// that do not form a real date.
    pub fn new(year: i32, month: u8, day: u8, fraction: f64) -> Result<Self, ConversionError> {
        let month_typed = Month::new(month)?;
        let day_typed = Day::new(day, year, month)?;
        if !(0.0..1.0).contains(&fraction) {
            return Err(ConversionError::InvalidFraction(fraction));
        }
        Ok(Self {
            year,
            month: month_typed,
            day: day_typed,
            fraction,
        })
    }

    /// Returns the year (astronomical numbering)
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month as u8
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// Returns the day of month as u8
    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    /// Returns the Month type
    pub const fn month_typed(&self) -> Month {
        self.month
    }

    /// Returns the Day type
    pub const fn day_typed(&self) -> Day {
        self.day
    }

    /// Returns the fraction of the day elapsed since 0h
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    pub const fn is_leap_year(&self) -> bool {
        is_leap_year(self.year)
    }

    /// Converts this date with the given converter.
    ///
    /// # Errors
    /// Propagates the converter's error.
    pub fn to_julian<C: CalendarConverter + ?Sized>(&self, converter: &C) -> Result<JulianDate, ConversionError> {
        converter.calendar_to_julian(self.year, self.month(), self.day(), self.fraction)
    }

    fn parse_component<T: FromStr>(s: &str) -> Result<T, ConversionError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConversionError::InvalidFormat(s.to_owned()));
        }
        s.parse::<T>()
            .map_err(|_| ConversionError::InvalidFormat(s.to_owned()))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            write!(f, "{DATE_SEPARATOR}")?;
        }
        write!(
            f,
            "{:04}{DATE_SEPARATOR}{:02}{DATE_SEPARATOR}{:02}",
            self.year.unsigned_abs(),
            self.month.get(),
            self.day.get()
        )?;
        if self.fraction != 0.0 {
            write!(f, "{FRACTION_SEPARATOR}{}", self.fraction)?;
        }
        Ok(())
    }
}

impl FromStr for CalendarDate {
    type Err = ConversionError;

    /// Parses `[-]YYYY-MM-DD[+F]`, e.g. `-1374-05-03+0.578`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConversionError::InvalidFormat("Empty date string".to_owned()));
        }

        let (date_part, fraction) = match trimmed.split_once(FRACTION_SEPARATOR) {
            Some((date, frac)) => {
                let frac = frac.trim();
                let value = frac
                    .parse::<f64>()
                    .map_err(|_| ConversionError::InvalidFormat(frac.to_owned()))?;
                (date.trim(), value)
            },
            None => (trimmed, 0.0),
        };

        let (negative, unsigned) = match date_part.strip_prefix(DATE_SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, date_part),
        };

        let parts: Vec<&str> = unsigned.split(DATE_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(ConversionError::InvalidFormat(format!(
                "Expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, found {} components: {s}",
                parts.len()
            )));
        }

        let magnitude: i64 = Self::parse_component(parts[0])?;
        let signed = if negative { -magnitude } else { magnitude };
        let year = i32::try_from(signed).map_err(|_| ConversionError::InvalidFormat(parts[0].to_owned()))?;
        let month: u8 = Self::parse_component(parts[1])?;
        let day: u8 = Self::parse_component(parts[2])?;

        Self::new(year, month, day, fraction)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
