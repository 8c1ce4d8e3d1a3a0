//! Cycle-decomposition conversion.
//!
//! Elapsed time is broken into whole 400-year Gregorian cycles, then whole
//! remaining years, then months and days. Non-negative years count forward
//! from the start of their cycle. Negative years count backward from the end
//! of theirs, anchored at `year + 1` so that truncating integer division
//! splits the cycles the same way on both sides of zero.

use crate::config::ConverterConfig;
use crate::consts::{GREGORIAN_CYCLE_DAYS, GREGORIAN_CYCLE_YEARS};
use crate::converter::{
    CalendarConverter, calendar_date, days_since_jan1_year0, julian_from_epoch_days, scan_months_backward,
    scan_months_forward, validate,
};
use crate::julian::JulianDate;
use crate::types::{Day, Month, days_from_jan0, days_in_complete_years, days_until_dec32, year_length};
use crate::{CalendarDate, ConversionError};

/// January 0.0 of year 0 already lies one day inside the negative years.
const OVERHANG: i64 = 1;

const CYCLE_YEARS: i32 = GREGORIAN_CYCLE_YEARS as i32;

/// Converter that decomposes dates into whole Gregorian cycles, mirrored by sign of year.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDecomposition {
    config: ConverterConfig,
}

impl CycleDecomposition {
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Days from January 0 of year 0 to the given date, for `year >= 0`.
    fn days_after_epoch(year: i32, month: Month, day: Day) -> i64 {
        let cycles = year / CYCLE_YEARS;
        let full_cycles = i64::from(cycles) * GREGORIAN_CYCLE_DAYS;
        let remainder_years = days_in_complete_years(cycles * CYCLE_YEARS, year);
        let remainder_days = days_from_jan0(year, month, day);
        full_cycles + remainder_years + remainder_days
    }

    /// Days from January 0 of year 0 to the given date, for `year < 0`; never positive.
    fn days_before_epoch(year: i32, month: Month, day: Day) -> i64 {
        let biased = year + 1;
        let cycles = biased / CYCLE_YEARS;
        let full_cycles = (i64::from(cycles) * GREGORIAN_CYCLE_DAYS).abs();
        let remainder_years = days_in_complete_years(biased, cycles * CYCLE_YEARS);
        let remainder_days = days_until_dec32(year, month, day);
        OVERHANG - (full_cycles + remainder_years + remainder_days)
    }

    /// Resolves a day on or after January 1 of year 0 by counting forward from its cycle start.
    fn locate_forward(days: i64) -> Result<(i64, Month, i64), ConversionError> {
        let cycles = days.div_euclid(GREGORIAN_CYCLE_DAYS);
        let mut year = cycles * GREGORIAN_CYCLE_YEARS;
        let mut cursor = cycles * GREGORIAN_CYCLE_DAYS;

        for _ in 0..GREGORIAN_CYCLE_YEARS {
            let length = year_length(year as i32);
            if cursor + length > days {
                break;
            }
            cursor += length;
            year += 1;
        }

        let scan = scan_months_forward(year as i32, days - cursor)?;
        Ok((year, scan.month, scan.day))
    }

    /// Resolves a day before January 1 of year 0 by counting backward from its cycle end.
    fn locate_backward(days: i64) -> Result<(i64, Month, i64), ConversionError> {
        let cycles = days.div_euclid(GREGORIAN_CYCLE_DAYS) + 1;
        let mut year = cycles * GREGORIAN_CYCLE_YEARS - 1;
        // January 1 of the year after `year`
        let mut cursor = cycles * GREGORIAN_CYCLE_DAYS;

        for _ in 0..GREGORIAN_CYCLE_YEARS {
            let length = year_length(year as i32);
            if cursor - length <= days {
                break;
            }
            cursor -= length;
            year -= 1;
        }

        let scan = scan_months_backward(year as i32, cursor - days)?;
        Ok((year, scan.month, scan.day))
    }
}

impl CalendarConverter for CycleDecomposition {
    fn name(&self) -> &'static str {
        "cycle-decomposition"
    }

    fn calendar_to_julian(&self, year: i32, month: u8, day: u8, fraction: f64) -> Result<JulianDate, ConversionError> {
        let (month, day) = validate(year, month, day)?;
        let days = if year >= 0 {
            Self::days_after_epoch(year, month, day)
        } else {
            Self::days_before_epoch(year, month, day)
        };
        Ok(julian_from_epoch_days(days, fraction))
    }

    fn julian_to_calendar(&self, jd: JulianDate) -> Result<CalendarDate, ConversionError> {
        let (days, fraction) = days_since_jan1_year0(&jd, &self.config)?;
        let (year, month, day) = if days >= 0 {
            Self::locate_forward(days)?
        } else {
            Self::locate_backward(days)?
        };
        calendar_date(&jd, &self.config, year, month, day, fraction)
    }
}
