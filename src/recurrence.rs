//! Unified recurrence conversion.
//!
//! The forward direction counts leap years before the target year with one
//! division-based formula that holds for either sign of year. The inverse
//! floors to the containing 400-year cycle, jumps close to the target year
//! with an under-estimate, and finishes with a short bounded search.

use crate::config::ConverterConfig;
use crate::consts::{
    CENTURY_CYCLE, COMMON_YEAR_DAYS, DAYS_BEFORE_MONTH, FEBRUARY, GREGORIAN_CYCLE_DAYS, GREGORIAN_CYCLE_YEARS,
    LEAP_YEAR_CYCLE, LEAP_YEAR_DAYS,
};
use crate::converter::{
    CalendarConverter, MonthScan, calendar_date, days_since_jan1_year0, julian_from_epoch_days, scan_months_forward,
    validate,
};
use crate::julian::JulianDate;
use crate::types::{Month, is_leap_year, year_length};
use crate::{CalendarDate, ConversionError};

/// Year advances the search may need after the initial jump.
const MAX_YEAR_STEPS: usize = 2;

/// Converter built on a sign-independent leap-year count and a bounded inverse search.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedRecurrence {
    config: ConverterConfig,
}

/// Where a day falls, and how many loop steps the search took to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
    pub year:  i64,
    pub month: Month,
    pub day:   i64,
    pub steps: usize,
}

impl UnifiedRecurrence {
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Days in all years from year 0 up to, but excluding, `year`; negative for negative years.
    ///
    /// Counting leap years with truncating division undercounts by one for
    /// positive years because year 0 is itself a leap year, hence `y - 1`
    /// on that side and the extra leap year added back.
    pub(crate) const fn days_before_year(year: i64) -> i64 {
        let y_prime = if year > 0 { year - 1 } else { year };
        let mut leap_years = y_prime / LEAP_YEAR_CYCLE - y_prime / CENTURY_CYCLE + y_prime / GREGORIAN_CYCLE_YEARS;
        if year > 0 {
            leap_years += 1;
        }
        let common_years = year - leap_years;
        common_years * COMMON_YEAR_DAYS + leap_years * LEAP_YEAR_DAYS
    }

    /// Days from the start of a cycle to January 1 of its `years`-th year, `0 <= years < 400`.
    const fn days_into_cycle(years: i64) -> i64 {
        if years <= 0 {
            return 0;
        }
        let p = years - 1;
        years * COMMON_YEAR_DAYS + p / LEAP_YEAR_CYCLE - p / CENTURY_CYCLE + p / GREGORIAN_CYCLE_YEARS + 1
    }

    /// Finds the calendar date of a day counted from January 1 of year 0.
    pub(crate) fn locate(days: i64) -> Result<Located, ConversionError> {
        let cycles = days.div_euclid(GREGORIAN_CYCLE_DAYS);
        let target = days.rem_euclid(GREGORIAN_CYCLE_DAYS);
        let mut year = cycles * GREGORIAN_CYCLE_YEARS;

        // Every year has at most 366 days, so this never overshoots
        let jump = (target / LEAP_YEAR_DAYS - 1).max(0);
        let mut cursor = Self::days_into_cycle(jump);
        year += jump;

        let mut steps = 0;
        for _ in 0..MAX_YEAR_STEPS {
            let length = year_length(year as i32);
            if cursor + length > target {
                break;
            }
            cursor += length;
            year += 1;
            steps += 1;
        }
        debug_assert!(cursor + year_length(year as i32) > target, "year search exhausted its bound");

        let MonthScan { month, day, probes } = scan_months_forward(year as i32, target - cursor)?;
        Ok(Located {
            year,
            month,
            day,
            steps: steps + probes,
        })
    }
}

impl CalendarConverter for UnifiedRecurrence {
    fn name(&self) -> &'static str {
        "unified-recurrence"
    }

    fn calendar_to_julian(&self, year: i32, month: u8, day: u8, fraction: f64) -> Result<JulianDate, ConversionError> {
        let (month, day) = validate(year, month, day)?;
        let mut days = Self::days_before_year(i64::from(year));
        days += DAYS_BEFORE_MONTH[usize::from(month.get() - 1)];
        if is_leap_year(year) && month.get() > FEBRUARY {
            days += 1;
        }
        days += i64::from(day.get());
        Ok(julian_from_epoch_days(days, fraction))
    }

    fn julian_to_calendar(&self, jd: JulianDate) -> Result<CalendarDate, ConversionError> {
        let (days, fraction) = days_since_jan1_year0(&jd, &self.config)?;
        let located = Self::locate(days)?;
        calendar_date(&jd, &self.config, located.year, located.month, located.day, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{JAN_0_YEAR_0, MAX_SEARCH_STEPS};
    use crate::cycle::CycleDecomposition;
    use crate::test_utils::{ArbitraryDate, date};
    use crate::types::days_in_complete_years;

    fn to_jd(year: i32, m: u8, d: u8, fraction: f64) -> f64 {
        UnifiedRecurrence::default()
            .calendar_to_julian(year, m, d, fraction)
            .expect("valid date")
            .to_f64()
    }

    #[test]
    fn test_days_before_year() {
        struct TestCase {
            year:        i64,
            days:        i64,
            description: &'static str,
        }

        let cases = [
            TestCase { year: 0, days: 0, description: "nothing precedes year 0" },
            TestCase { year: 1, days: 366, description: "year 0 is leap" },
            TestCase { year: 5, days: 2 * 366 + 3 * 365, description: "years 0 and 4 are leap" },
            TestCase { year: -1, days: -365, description: "year -1 is common" },
            TestCase { year: -4, days: -(366 + 3 * 365), description: "year -4 is leap" },
            TestCase { year: 400, days: 146_097, description: "one full cycle" },
            TestCase { year: -400, days: -146_097, description: "one full cycle back" },
            TestCase { year: 2000, days: 5 * 146_097, description: "five cycles" },
        ];

        for case in &cases {
            assert_eq!(UnifiedRecurrence::days_before_year(case.year), case.days, "{}", case.description);
        }
    }

    #[test]
    fn test_days_before_year_matches_year_sums() {
        for year in -1200..=1200 {
            assert_eq!(
                UnifiedRecurrence::days_before_year(i64::from(year)),
                days_in_complete_years(0, year),
                "year {year}"
            );
        }
    }

    #[test]
    fn test_days_into_cycle() {
        for years in 0..400 {
            assert_eq!(
                UnifiedRecurrence::days_into_cycle(i64::from(years)),
                days_in_complete_years(0, years),
                "{years} years"
            );
        }
    }

    #[test]
    fn test_published_values() {
        assert_eq!(to_jd(2003, 6, 1, 0.0), 2_400_000.5 + 52_791.0);
        assert_eq!(to_jd(1996, 2, 11, 0.0), 2_400_000.5 + 50_124.0);
        assert_eq!(to_jd(1900, 1, 1, 0.0), 2_415_020.5);
        assert_eq!(to_jd(30000, 1, 1, 0.5), 12_678_335.0);
        assert_eq!(to_jd(-4713, 11, 24, 0.5), 0.0);
        assert!((to_jd(-1374, 5, 3, 0.578) - 1_219_339.078).abs() < 1e-9);
    }

    #[test]
    fn test_epoch() {
        assert_eq!(to_jd(-1, 12, 31, 0.0), JAN_0_YEAR_0);
        assert_eq!(to_jd(0, 3, 1, 0.0), JAN_0_YEAR_0 + 61.0);
    }

    #[test]
    fn test_leap_day_recovered() {
        let converter = UnifiedRecurrence::default();
        for year in [-2000, -400, -4, 0, 4, 1600, 2000, 2024] {
            let jd = converter.calendar_to_julian(year, 2, 29, 0.0).expect("leap day exists");
            let back = converter.julian_to_calendar(jd).expect("in range");
            assert_eq!((back.year(), back.month(), back.day()), (year, 2, 29), "{year}");
        }
        for year in [-1900, -100, -1, 1, 100, 1900, 2100] {
            assert!(converter.calendar_to_julian(year, 2, 29, 0.0).is_err(), "{year}");
            let jd = converter.calendar_to_julian(year, 2, 28, 0.0).expect("Feb 28").add_days(1.0);
            let back = converter.julian_to_calendar(jd).expect("in range");
            assert_eq!((back.month(), back.day()), (3, 1), "{year}");
        }
    }

    #[test]
    fn test_search_bound_over_whole_cycle() {
        // Every day of a cycle, and the same days one cycle on either side of year 0
        for offset in [-GREGORIAN_CYCLE_DAYS, 0, 7 * GREGORIAN_CYCLE_DAYS] {
            for day in 0..GREGORIAN_CYCLE_DAYS {
                let located = UnifiedRecurrence::locate(offset + day).expect("valid day");
                assert!(located.steps <= MAX_SEARCH_STEPS, "day {} took {} steps", offset + day, located.steps);
            }
        }
    }

    #[test]
    fn test_search_bound_at_extremes() {
        let ceiling = ConverterConfig::default().julian_date_ceiling() as i64;
        for days in [-ceiling, -ceiling + 1, ceiling - 2_000_000, ceiling - 1, i64::from(i32::MAX)] {
            let located = UnifiedRecurrence::locate(days).expect("valid day");
            assert!(located.steps <= MAX_SEARCH_STEPS, "day {days} took {} steps", located.steps);
        }
    }

    #[test]
    fn test_locate_agrees_with_cycle_decomposition() {
        let recurrence = UnifiedRecurrence::default();
        let cycle = CycleDecomposition::default();
        // One cycle straddling year 0
        let start = JAN_0_YEAR_0 - (GREGORIAN_CYCLE_DAYS / 2) as f64;
        for day in 0..GREGORIAN_CYCLE_DAYS {
            let jd = JulianDate::new(start + day as f64, 0.25);
            let a = recurrence.julian_to_calendar(jd).expect("in range");
            let b = cycle.julian_to_calendar(jd).expect("in range");
            assert_eq!(a, b, "{jd}");
        }
    }

    #[test]
    fn test_inverse_cases() {
        let converter = UnifiedRecurrence::default();
        let cases = [
            (JulianDate::new(2_400_000.5, 50_123.9999), date(1996, 2, 10, 0.9999)),
            (JulianDate::from_f64(0.0), date(-4713, 11, 24, 0.5)),
            (JulianDate::from_f64(1_219_339.078), date(-1374, 5, 3, 0.578)),
            (JulianDate::from_f64(12_678_335.0), date(30000, 1, 1, 0.5)),
            (JulianDate::new(0.0, JAN_0_YEAR_0), date(-1, 12, 31, 0.0)),
        ];
        for (jd, want) in cases {
            let got = converter.julian_to_calendar(jd).expect("in range");
            assert_eq!((got.year(), got.month(), got.day()), (want.year(), want.month(), want.day()), "{jd}");
            assert!((got.fraction() - want.fraction()).abs() < 1e-7, "{jd}");
        }
    }

    #[test]
    fn test_ceiling_is_configurable() {
        let converter = UnifiedRecurrence::new(ConverterConfig::new(3e6).expect("valid ceiling"));
        assert!(converter.julian_to_calendar(JulianDate::from_f64(2_451_545.0)).is_ok());
        assert!(matches!(
            converter.julian_to_calendar(JulianDate::from_f64(3_000_001.0)),
            Err(ConversionError::OutOfRange { max, .. }) if max == 3e6
        ));
        assert!(converter.julian_to_calendar(JulianDate::new(-2e6, -1.5e6)).is_err());
    }

    quickcheck::quickcheck! {
        fn prop_round_trip(input: ArbitraryDate) -> bool {
            let converter = UnifiedRecurrence::default();
            let d = input.0;
            let Ok(jd) = converter.date_to_julian(&d) else { return false };
            let Ok(back) = converter.julian_to_calendar(jd) else { return false };
            back.year() == d.year()
                && back.month() == d.month()
                && back.day() == d.day()
                && (back.fraction() - d.fraction()).abs() < 1e-9
        }

        fn prop_search_bound(input: ArbitraryDate) -> bool {
            let Ok(jd) = UnifiedRecurrence::default().date_to_julian(&input.0) else { return false };
            let Ok((days, _)) = days_since_jan1_year0(&jd, &ConverterConfig::default()) else { return false };
            UnifiedRecurrence::locate(days).is_ok_and(|located| located.steps <= MAX_SEARCH_STEPS)
        }

        fn prop_agrees_with_cycle_decomposition(input: ArbitraryDate) -> bool {
            let d = input.0;
            let a = UnifiedRecurrence::default().date_to_julian(&d);
            let b = CycleDecomposition::default().date_to_julian(&d);
            a == b
        }

        fn prop_monotonic(a: ArbitraryDate, b: ArbitraryDate) -> quickcheck::TestResult {
            let (a, b) = (a.0, b.0);
            if a == b {
                return quickcheck::TestResult::discard();
            }
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let converter = UnifiedRecurrence::default();
            let (Ok(jd_lo), Ok(jd_hi)) = (converter.date_to_julian(&lo), converter.date_to_julian(&hi)) else {
                return quickcheck::TestResult::failed();
            };
            let ordered = jd_lo.jd1() < jd_hi.jd1() || (jd_lo.jd1() == jd_hi.jd1() && jd_lo.jd2() < jd_hi.jd2());
            quickcheck::TestResult::from_bool(ordered)
        }
    }
}
