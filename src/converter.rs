use crate::config::ConverterConfig;
use crate::consts::{DECEMBER, JAN_0_YEAR_0, JAN_1_YEAR_0_JDN, JANUARY};
use crate::julian::{JulianDate, SplitDay};
use crate::types::{Day, Month, days_in_month};
use crate::{CalendarDate, ConversionError};

/// Converts between proleptic Gregorian calendar dates and Julian Dates.
pub trait CalendarConverter {
    /// Short label used in harness output.
    fn name(&self) -> &'static str;

    /// Converts a calendar date plus day fraction to a two-part Julian Date.
    ///
    /// # Errors
    /// `InvalidMonth` or `InvalidDay` for a date that does not exist; restricted
    /// converters may also return `DateTooEarly`.
    fn calendar_to_julian(&self, year: i32, month: u8, day: u8, fraction: f64) -> Result<JulianDate, ConversionError>;

    /// Converts a two-part Julian Date, split any way, to a calendar date.
    ///
    /// # Errors
    /// `OutOfRange` when `jd1 + jd2` is outside the converter's accepted window.
    fn julian_to_calendar(&self, jd: JulianDate) -> Result<CalendarDate, ConversionError>;

    /// Converts an already validated calendar date.
    ///
    /// # Errors
    /// Same as [`CalendarConverter::calendar_to_julian`].
    fn date_to_julian(&self, date: &CalendarDate) -> Result<JulianDate, ConversionError> {
        self.calendar_to_julian(date.year(), date.month(), date.day(), date.fraction())
    }
}

/// Validates month and day before any arithmetic.
pub(crate) fn validate(year: i32, month: u8, day: u8) -> Result<(Month, Day), ConversionError> {
    let month_typed = Month::new(month)?;
    let day_typed = Day::new(day, year, month)?;
    Ok((month_typed, day_typed))
}

/// Builds the output of a forward conversion from whole days counted from January 0 of year 0.
pub(crate) fn julian_from_epoch_days(days: i64, fraction: f64) -> JulianDate {
    JulianDate::new(JAN_0_YEAR_0 + days as f64, fraction)
}

/// Range-checks a Julian Date against the configured ceiling and splits it into
/// whole days counted from January 1 of year 0 (day 0) plus the day fraction.
pub(crate) fn days_since_jan1_year0(jd: &JulianDate, config: &ConverterConfig) -> Result<(i64, f64), ConversionError> {
    let ceiling = config.julian_date_ceiling();
    jd.check_range(-ceiling, ceiling)?;
    let SplitDay { jdn, fraction } = jd.split_day();
    Ok((jdn - JAN_1_YEAR_0_JDN, fraction))
}

/// Assembles the result of an inverse conversion.
pub(crate) fn calendar_date(
    jd: &JulianDate,
    config: &ConverterConfig,
    year: i64,
    month: Month,
    day: i64,
    fraction: f64,
) -> Result<CalendarDate, ConversionError> {
    let out_of_range = || {
        let ceiling = config.julian_date_ceiling();
        ConversionError::OutOfRange {
            jd:  jd.to_f64(),
            min: -ceiling,
            max: ceiling,
        }
    };
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let day = u8::try_from(day).map_err(|_| ConversionError::InvalidDay {
        year,
        month: month.get(),
        day: 0,
    })?;
    CalendarDate::new(year, month.get(), day, fraction)
}

/// Month and day found by scanning a year from January.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthScan {
    pub month:  Month,
    pub day:    i64,
    /// Months examined, including the one that holds the date.
    pub probes: usize,
}

/// Walks forward from January 1, adding whole months while they fit before the target.
///
/// `day_of_year` is zero-based and must be below the year's length.
pub(crate) fn scan_months_forward(year: i32, day_of_year: i64) -> Result<MonthScan, ConversionError> {
    let mut cursor = 0;
    for (probes, m) in (JANUARY..=DECEMBER).enumerate() {
        let month = Month::new(m)?;
        let length = i64::from(days_in_month(year, month));
        if cursor + length > day_of_year || m == DECEMBER {
            return Ok(MonthScan {
                month,
                day: day_of_year - cursor + 1,
                probes: probes + 1,
            });
        }
        cursor += length;
    }
    Err(ConversionError::InvalidMonth(DECEMBER + 1))
}

/// Walks backward from December 32, removing whole months while the target precedes them.
///
/// `days_before_year_end` counts from the target day to January 1 of the next year,
/// so it is 1 for December 31 and must not exceed the year's length.
pub(crate) fn scan_months_backward(year: i32, days_before_year_end: i64) -> Result<MonthScan, ConversionError> {
    let mut cursor = 0;
    for (probes, m) in (JANUARY..=DECEMBER).rev().enumerate() {
        let month = Month::new(m)?;
        let length = i64::from(days_in_month(year, month));
        if cursor + length >= days_before_year_end || m == JANUARY {
            return Ok(MonthScan {
                month,
                day: length + cursor + 1 - days_before_year_end,
                probes: probes + 1,
            });
        }
        cursor += length;
    }
    Err(ConversionError::InvalidMonth(0))
}
