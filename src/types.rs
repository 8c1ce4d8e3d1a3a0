use crate::ConversionError;
use crate::consts::{
    CENTURY_CYCLE, COMMON_YEAR_DAYS, DAYS_IN_MONTH, DECEMBER, FEBRUARY, FEBRUARY_DAYS_LEAP,
    GREGORIAN_CYCLE_YEARS, JANUARY, LEAP_YEAR_CYCLE, LEAP_YEAR_DAYS, MAX_DAY, MAX_MONTH, MIN_DAY,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// A month value guaranteed to be in the range `1..=MAX_MONTH` (1..=12)
/// Uses `NonZeroU8` internally, so 0 is not a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(NonZeroU8);

impl Month {
    /// Creates a new Month, validating that it's non-zero and <= `MAX_MONTH`
    ///
    /// # Errors
    /// Returns `ConversionError::InvalidMonth` if the value is 0 or > `MAX_MONTH`.
    pub fn new(value: u8) -> Result<Self, ConversionError> {
        let non_zero = NonZeroU8::new(value).ok_or(ConversionError::InvalidMonth(value))?;
        if value > MAX_MONTH {
            return Err(ConversionError::InvalidMonth(value));
        }
        Ok(Self(non_zero))
    }

    /// Returns the month value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for Month {
    type Error = ConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A day-of-month value, validated against its year and month at construction.
/// Uses `NonZeroU8` internally, so 0 is not a valid day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Day(NonZeroU8);

impl Day {
    /// Creates a new Day, validating that it's non-zero and fits the given year and month.
    ///
    /// # Errors
    /// Returns `ConversionError::InvalidMonth` for a month outside 1..=12 and
    /// `ConversionError::InvalidDay` if the day does not exist in that month.
    pub fn new(value: u8, year: i32, month: u8) -> Result<Self, ConversionError> {
        let month = Month::new(month)?;
        let invalid = ConversionError::InvalidDay {
            year,
            month: month.get(),
            day: value,
        };
        let non_zero = NonZeroU8::new(value).ok_or_else(|| invalid.clone())?;
        if value > days_in_month(year, month) {
            return Err(invalid);
        }
        Ok(Self(non_zero))
    }

    /// Returns the day value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for Day {
    type Error = ConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        // No year/month context here: only the widest month bound can be checked
        if !(MIN_DAY..=MAX_DAY).contains(&value) {
            return Err(ConversionError::DayOutOfBounds(value));
        }
        let non_zero = NonZeroU8::new(value).ok_or(ConversionError::DayOutOfBounds(value))?;
        Ok(Self(non_zero))
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> Self {
        day.0.get()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Calendar primitives. Years use astronomical numbering: year 0 exists and is a leap year.

pub const fn is_leap_year(year: i32) -> bool {
    let year = year as i64;
    if year % CENTURY_CYCLE == 0 {
        year % GREGORIAN_CYCLE_YEARS == 0
    } else {
        year % LEAP_YEAR_CYCLE == 0
    }
}

pub const fn year_length(year: i32) -> i64 {
    if is_leap_year(year) { LEAP_YEAR_DAYS } else { COMMON_YEAR_DAYS }
}

pub const fn days_in_month(year: i32, month: Month) -> u8 {
    let month = month.get();
    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}

/// Month length for a raw month number.
///
/// # Errors
/// Returns `ConversionError::InvalidMonth` if `month` is outside 1..=12.
pub fn month_length(year: i32, month: u8) -> Result<u8, ConversionError> {
    Ok(days_in_month(year, Month::new(month)?))
}

/// Sum of year lengths for `start_year <= y < end_year`.
///
/// A reversed range yields the negated sum of the forward range, so
/// `days_in_complete_years(a, b) == -days_in_complete_years(b, a)` always holds.
pub fn days_in_complete_years(start_year: i32, end_year: i32) -> i64 {
    if end_year < start_year {
        return -days_in_complete_years(end_year, start_year);
    }
    (start_year..end_year).map(year_length).sum()
}

/// Days from January 0 (December 31 of the previous year) to the given date.
pub fn days_from_jan0(year: i32, month: Month, day: Day) -> i64 {
    let completed_months: i64 = (JANUARY..month.get())
        .filter_map(|m| Month::new(m).ok())
        .map(|m| i64::from(days_in_month(year, m)))
        .sum();
    completed_months + i64::from(day.get())
}

/// Days from the given date to December 32 (January 1 of the next year).
pub fn days_until_dec32(year: i32, month: Month, day: Day) -> i64 {
    let later_months: i64 = (month.get() + 1..=DECEMBER)
        .filter_map(|m| Month::new(m).ok())
        .map(|m| i64::from(days_in_month(year, m)))
        .sum();
    let rest_of_month = i64::from(days_in_month(year, month)) + 1 - i64::from(day.get());
    later_months + rest_of_month
}
