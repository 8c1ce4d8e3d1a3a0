//! The classic restricted-domain conversion, used to cross-check the other converters.
//!
//! Both directions work on the Modified Julian Date with integer arithmetic
//! only. Calendar input is accepted from -4799-01-01 onward, Julian Dates
//! from -68569.5 (-4900-03-01) onward.

use crate::config::ConverterConfig;
use crate::consts::{MJD_ZERO_POINT, REFERENCE_EARLIEST_JD, REFERENCE_EARLIEST_YEAR};
use crate::converter::{CalendarConverter, validate};
use crate::julian::{JulianDate, SplitDay};
use crate::{CalendarDate, ConversionError};

/// Converter implementing the widely published integer formulas on MJD.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceConverter {
    config: ConverterConfig,
}

impl ReferenceConverter {
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Modified Julian Date of 0h on the given date.
    const fn modified_julian_day(year: i64, month: i64, day: i64) -> i64 {
        let my = (month - 14) / 12;
        let year_plus_my = year + my;
        (1461 * (year_plus_my + 4800)) / 4 + (367 * (month - 2 - 12 * my)) / 12
            - (3 * ((year_plus_my + 4900) / 100)) / 4
            + day
            - 2_432_076
    }

    /// Year, month and day of a noon-based Julian Day Number.
    const fn civil_from_day_number(jdn: i64) -> (i64, i64, i64) {
        let mut l = jdn + 68_569;
        let n = (4 * l) / 146_097;
        l -= (146_097 * n + 3) / 4;
        let i = (4000 * (l + 1)) / 1_461_001;
        l -= (1461 * i) / 4 - 31;
        let k = (80 * l) / 2447;
        let day = l - (2447 * k) / 80;
        l = k / 11;
        let month = k + 2 - 12 * l;
        let year = 100 * (n - 49) + i + l;
        (year, month, day)
    }
}

impl CalendarConverter for ReferenceConverter {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn calendar_to_julian(&self, year: i32, month: u8, day: u8, fraction: f64) -> Result<JulianDate, ConversionError> {
        if year < REFERENCE_EARLIEST_YEAR {
            return Err(ConversionError::DateTooEarly {
                year,
                earliest: REFERENCE_EARLIEST_YEAR,
            });
        }
        let (month, day) = validate(year, month, day)?;
        let mjd = Self::modified_julian_day(i64::from(year), i64::from(month.get()), i64::from(day.get()));
        Ok(JulianDate::new(MJD_ZERO_POINT, mjd as f64 + fraction))
    }

    fn julian_to_calendar(&self, jd: JulianDate) -> Result<CalendarDate, ConversionError> {
        jd.check_range(REFERENCE_EARLIEST_JD, self.config.julian_date_ceiling())?;
        let SplitDay { jdn, fraction } = jd.split_day();
        let (year, month, day) = Self::civil_from_day_number(jdn);

        let year = i32::try_from(year).map_err(|_| ConversionError::OutOfRange {
            jd:  jd.to_f64(),
            min: REFERENCE_EARLIEST_JD,
            max: self.config.julian_date_ceiling(),
        })?;
        let month = u8::try_from(month).map_err(|_| ConversionError::InvalidMonth(0))?;
        let day = u8::try_from(day).map_err(|_| ConversionError::InvalidDay { year, month, day: 0 })?;
        CalendarDate::new(year, month, day, fraction)
    }
}
