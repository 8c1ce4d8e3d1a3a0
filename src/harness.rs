//! Verification harness.
//!
//! Drives the converters against dates with published Julian Dates and
//! against every day of consecutive years, counting passes, failures and
//! skips. Each check is independent: a failure is logged and counted, never
//! propagated.

use crate::config::ConverterConfig;
use crate::consts::{JAN_0_YEAR_0, JANUARY, MAX_MONTH, MIN_DAY};
use crate::converter::CalendarConverter;
use crate::cycle::CycleDecomposition;
use crate::julian::JulianDate;
use crate::prelude::*;
use crate::recurrence::UnifiedRecurrence;
use crate::reference::ReferenceConverter;
use crate::types::{month_length, year_length};
use crate::{CalendarDate, ConversionError};
use log::{debug, info, trace, warn};
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::thread;

/// Years around year 0 whose every day is checked by [`Harness::run`].
pub const SMALL_YEARS: RangeInclusive<i32> = -9..=12;

/// Tolerance for a forward conversion whose day fraction is not zero.
const JULIAN_DATE_TOLERANCE: f64 = 1e-9;

/// Tolerance for the day fraction returned by an inverse conversion.
const FRACTION_TOLERANCE: f64 = f32::EPSILON as f64;

/// A calendar date whose Julian Date is given by a published source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedCase {
    pub year:     i32,
    pub month:    u8,
    pub day:      u8,
    pub fraction: f64,
    pub jd1:      f64,
    pub jd2:      f64,
    pub source:   &'static str,
}

impl PublishedCase {
    const fn new(year: i32, month: u8, day: u8, fraction: f64, jd: f64, source: &'static str) -> Self {
        Self {
            year,
            month,
            day,
            fraction,
            jd1: jd,
            jd2: 0.0,
            source,
        }
    }

    pub const fn julian_date(&self) -> JulianDate {
        JulianDate::new(self.jd1, self.jd2)
    }
}

const SOFA: &str = "SOFA t_sofa_c";
const SUPPLEMENT: &str = "Explanatory Supplement 1961, p. 437";
const GUIDE: &str = "Guide de Donnees Astronomiques 2017, p. 8";
const VONDRAK: &str = "Vondrak, Wallace, Capitaine 2011";
const RASC: &str = "RASC Observer's Handbook 2024, p. 47";
const MEEUS: &str = "Meeus, Astronomical Algorithms 1991, p. 61";
const HARVARD: &str = "Harvard calendar converter";
const ORIGIN: &str = "Julian Date origin";
const EARLIEST: &str = "earliest reference date";

/// Dates with literal Julian Dates taken from astronomical tables.
pub const PUBLISHED_CASES: &[PublishedCase] = &[
    PublishedCase {
        year:     2003,
        month:    6,
        day:      1,
        fraction: 0.0,
        jd1:      2_400_000.5,
        jd2:      52_791.0,
        source:   SOFA,
    },
    PublishedCase {
        year:     1996,
        month:    2,
        day:      11,
        fraction: 0.0,
        jd1:      2_400_000.5,
        jd2:      50_124.0,
        source:   SOFA,
    },
    PublishedCase::new(1500, 1, 1, 0.0, 2_268_923.5, SUPPLEMENT),
    PublishedCase::new(1600, 1, 1, 0.0, 2_305_447.5, SUPPLEMENT),
    PublishedCase::new(1700, 1, 1, 0.0, 2_341_972.5, SUPPLEMENT),
    PublishedCase::new(1800, 1, 1, 0.0, 2_378_496.5, SUPPLEMENT),
    PublishedCase::new(1900, 1, 1, 0.0, 2_415_020.5, SUPPLEMENT),
    PublishedCase::new(1500, 3, 1, 0.0, 2_268_923.5 + 59.0, SUPPLEMENT),
    // Only 1600 has a February 29
    PublishedCase::new(1600, 3, 1, 0.0, 2_305_447.5 + 60.0, SUPPLEMENT),
    PublishedCase::new(1700, 3, 1, 0.0, 2_341_972.5 + 59.0, SUPPLEMENT),
    PublishedCase::new(1800, 3, 1, 0.0, 2_378_496.5 + 59.0, SUPPLEMENT),
    PublishedCase::new(1900, 3, 1, 0.0, 2_415_020.5 + 59.0, SUPPLEMENT),
    PublishedCase::new(1950, 1, 1, 0.5, 2_433_283.0, GUIDE),
    PublishedCase::new(2000, 1, 1, 0.5, 2_451_545.0, GUIDE),
    PublishedCase::new(2050, 1, 1, 0.5, 2_469_808.0, GUIDE),
    PublishedCase::new(2090, 1, 1, 0.5, 2_484_418.0, GUIDE),
    // 13:52:19.2 TT
    PublishedCase::new(-1374, 5, 3, 0.578, 1_219_339.078, VONDRAK),
    PublishedCase::new(2024, 1, 1, 0.0, 2_460_310.5, RASC),
    PublishedCase::new(2024, 3, 1, 0.0, 2_460_370.5, RASC),
    PublishedCase::new(1957, 10, 4, 0.81, 2_436_116.31, MEEUS),
    PublishedCase::new(1987, 6, 19, 0.5, 2_446_966.0, MEEUS),
    PublishedCase::new(-8, 1, 1, 0.5, 1_718_138.0, HARVARD),
    PublishedCase::new(-101, 1, 1, 0.5, 1_684_171.0, HARVARD),
    PublishedCase::new(-799, 1, 1, 0.5, 1_429_232.0, HARVARD),
    PublishedCase::new(-800, 1, 1, 0.5, 1_428_866.0, HARVARD),
    PublishedCase::new(-801, 1, 1, 0.5, 1_428_501.0, HARVARD),
    PublishedCase::new(99, 12, 31, 0.5, 1_757_584.0, HARVARD),
    PublishedCase::new(100, 1, 1, 0.5, 1_757_585.0, HARVARD),
    PublishedCase::new(100, 1, 31, 0.5, 1_757_584.0 + 31.0, HARVARD),
    PublishedCase::new(100, 2, 1, 0.5, 1_757_584.0 + 32.0, HARVARD),
    // 100 is not a leap year
    PublishedCase::new(100, 2, 28, 0.5, 1_757_584.0 + 59.0, HARVARD),
    PublishedCase::new(100, 3, 1, 0.5, 1_757_584.0 + 60.0, HARVARD),
    PublishedCase::new(101, 1, 1, 0.5, 1_757_950.0, HARVARD),
    PublishedCase::new(200, 1, 1, 0.5, 1_794_109.0, HARVARD),
    PublishedCase::new(300, 1, 1, 0.5, 1_830_633.0, HARVARD),
    PublishedCase::new(400, 1, 1, 0.5, 1_867_157.0, HARVARD),
    PublishedCase::new(700, 1, 1, 0.5, 1_976_730.0, HARVARD),
    PublishedCase::new(800, 1, 1, 0.5, 2_013_254.0, HARVARD),
    PublishedCase::new(3000, 1, 1, 0.5, 2_816_788.0, HARVARD),
    PublishedCase::new(30000, 1, 1, 0.5, 12_678_335.0, HARVARD),
    // -4712-01-01 12h in the Julian calendar
    PublishedCase::new(-4713, 11, 24, 0.5, 0.0, ORIGIN),
    PublishedCase::new(-4799, 1, 1, 0.0, -31_738.5, EARLIEST),
];

/// Result of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    /// The reference converter does not cover the input.
    Skipped,
}

/// Running counts of check outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display(fmt = "{} passed, {} failed, {} skipped", passed, failed, skipped)]
pub struct Tally {
    pub passed:  usize,
    pub failed:  usize,
    pub skipped: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Adds counts accumulated elsewhere, e.g. by another sweep worker.
    pub fn merge(&mut self, other: Self) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Tallies for each section of a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display(fmt = "published cases: {}; year sweep: {}", published, sweep)]
pub struct Report {
    pub published: Tally,
    pub sweep:     Tally,
}

impl Report {
    pub fn total(&self) -> Tally {
        let mut total = self.published;
        total.merge(self.sweep);
        total
    }
}

/// A converter the harness can share across sweep workers.
pub type BoxedConverter = Box<dyn CalendarConverter + Send + Sync>;

/// Checks a set of converters, and the reference converter, against known answers.
pub struct Harness {
    reference:  ReferenceConverter,
    candidates: Vec<BoxedConverter>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl Harness {
    /// A harness over both unrestricted converters, all sharing one config.
    pub fn new(config: ConverterConfig) -> Self {
        let candidates: Vec<BoxedConverter> = vec![
            Box::new(CycleDecomposition::new(config)),
            Box::new(UnifiedRecurrence::new(config)),
        ];
        Self::with_candidates(ReferenceConverter::new(config), candidates)
    }

    pub fn with_candidates(reference: ReferenceConverter, candidates: Vec<BoxedConverter>) -> Self {
        Self { reference, candidates }
    }

    /// Names of every converter checked, reference first.
    pub fn converter_names(&self) -> Vec<&'static str> {
        std::iter::once(self.reference.name())
            .chain(self.candidates.iter().map(|c| c.name()))
            .collect()
    }

    /// Runs every published case and a sweep over [`SMALL_YEARS`].
    pub fn run(&self) -> Report {
        let report = Report {
            published: self.check_published(),
            sweep:     self.sweep_years(SMALL_YEARS),
        };
        info!(target: "harness", "{report}");
        report
    }

    pub fn check_published(&self) -> Tally {
        let mut tally = Tally::default();
        for case in PUBLISHED_CASES {
            tally.merge(self.check_both_directions(case));
        }
        info!(target: "harness", "published cases: {tally}");
        tally
    }

    /// Checks one case in both directions with every converter.
    pub fn check_both_directions(&self, case: &PublishedCase) -> Tally {
        debug!(
            target: "harness",
            "{}: {}-{:02}-{:02}+{} = JD {}",
            case.source, case.year, case.month, case.day, case.fraction, case.jd1 + case.jd2
        );
        let expected_date = (case.year, case.month, case.day, case.fraction);
        let expected_jd = case.jd1 + case.jd2;

        let mut tally = Tally::default();
        self.for_each_converter(|converter, restricted| {
            tally.record(check_to_calendar(converter, restricted, case.julian_date(), expected_date));
            tally.record(check_to_julian(converter, restricted, expected_date, expected_jd));
        });
        tally
    }

    /// Checks every day of every year in `years` with every converter.
    ///
    /// Expected Julian Dates come from a January 0 anchor accumulated one
    /// year length at a time from year 0, not from any converter.
    pub fn sweep_years(&self, years: RangeInclusive<i32>) -> Tally {
        let mut tally = Tally::default();
        let (start, end) = years.into_inner();
        if start > end {
            return tally;
        }

        let mut jan_0 = jan_0_of(start);
        for year in start..=end {
            tally.merge(self.check_year(year, jan_0));
            jan_0 += year_length(year) as f64;
        }
        info!(target: "harness", "years {start}..={end}: {tally}");
        tally
    }

    /// Same as [`Harness::sweep_years`], split into at most `workers` contiguous blocks of years,
    /// one thread each.
    pub fn sweep_years_parallel(&self, years: RangeInclusive<i32>, workers: NonZeroUsize) -> Tally {
        let mut tally = Tally::default();
        thread::scope(|scope| {
            let handles: Vec<_> = year_blocks(years, workers)
                .into_iter()
                .map(|block| scope.spawn(move || self.sweep_years(block)))
                .collect();
            for handle in handles {
                let worker = handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                tally.merge(worker);
            }
        });
        tally
    }

    fn check_year(&self, year: i32, jan_0: f64) -> Tally {
        let mut tally = Tally::default();
        let mut day_of_year = 0.0;
        for month in JANUARY..=MAX_MONTH {
            let Ok(length) = month_length(year, month) else {
                tally.record(Outcome::Failed);
                continue;
            };
            for day in MIN_DAY..=length {
                day_of_year += 1.0;
                let jd = jan_0 + day_of_year;
                let expected_date = (year, month, day, 0.0);
                self.for_each_converter(|converter, restricted| {
                    tally.record(check_to_calendar(converter, restricted, JulianDate::from_f64(jd), expected_date));
                    tally.record(check_to_julian(converter, restricted, expected_date, jd));
                });
            }
        }
        tally
    }

    fn for_each_converter(&self, mut check: impl FnMut(&dyn CalendarConverter, bool)) {
        check(&self.reference, true);
        for candidate in &self.candidates {
            check(candidate.as_ref(), false);
        }
    }
}

/// Splits `years` into at most `workers` contiguous blocks of near-equal length.
fn year_blocks(years: RangeInclusive<i32>, workers: NonZeroUsize) -> Vec<RangeInclusive<i32>> {
    let (start, end) = years.into_inner();
    if start > end {
        return Vec::new();
    }
    let span = (i64::from(end) - i64::from(start) + 1).unsigned_abs();
    let block = span.div_ceil(workers.get() as u64) as i64;

    let mut blocks = Vec::new();
    let mut first = i64::from(start);
    while first <= i64::from(end) {
        let last = (first + block - 1).min(i64::from(end));
        blocks.push((first as i32)..=(last as i32));
        first = last + 1;
    }
    blocks
}

/// Julian Date of January 0 of `year`, summed one year at a time.
fn jan_0_of(year: i32) -> f64 {
    let mut jd = JAN_0_YEAR_0;
    if year >= 0 {
        for y in 0..year {
            jd += year_length(y) as f64;
        }
    } else {
        for y in year..0 {
            jd -= year_length(y) as f64;
        }
    }
    jd
}

fn skipped_or_failed(converter: &dyn CalendarConverter, restricted: bool, error: &ConversionError) -> Outcome {
    match error {
        ConversionError::DateTooEarly { .. } | ConversionError::OutOfRange { .. } if restricted => {
            trace!(target: "harness", "{}: skipped, {error}", converter.name());
            Outcome::Skipped
        }
        _ => {
            warn!(target: "harness", "{}: FAILED, {error}", converter.name());
            Outcome::Failed
        }
    }
}

fn check_to_calendar(
    converter: &dyn CalendarConverter,
    restricted: bool,
    jd: JulianDate,
    (year, month, day, fraction): (i32, u8, u8, f64),
) -> Outcome {
    match converter.julian_to_calendar(jd) {
        Ok(date) => {
            let matches = (date.year(), date.month(), date.day()) == (year, month, day)
                && (date.fraction() - fraction).abs() < FRACTION_TOLERANCE;
            if matches {
                trace!(target: "harness", "{}: {jd} -> {date}", converter.name());
                Outcome::Passed
            } else {
                let expected = CalendarDate::new(year, month, day, fraction)
                    .map_or_else(|_| format!("{year}-{month}-{day}+{fraction}"), |d| d.to_string());
                warn!(
                    target: "harness",
                    "{}: FAILED {jd}, expected {expected}, got {date}",
                    converter.name()
                );
                Outcome::Failed
            }
        }
        Err(error) => skipped_or_failed(converter, restricted, &error),
    }
}

fn check_to_julian(
    converter: &dyn CalendarConverter,
    restricted: bool,
    (year, month, day, fraction): (i32, u8, u8, f64),
    expected: f64,
) -> Outcome {
    match converter.calendar_to_julian(year, month, day, fraction) {
        Ok(jd) => {
            let result = jd.to_f64();
            #[allow(clippy::float_cmp)]
            let matches = if fraction == 0.0 {
                result == expected
            } else {
                (result - expected).abs() < JULIAN_DATE_TOLERANCE
            };
            if matches {
                trace!(target: "harness", "{}: {year}-{month:02}-{day:02} -> {jd}", converter.name());
                Outcome::Passed
            } else {
                warn!(
                    target: "harness",
                    "{}: FAILED {year}-{month:02}-{day:02}+{fraction}, expected JD {expected:.9}, got {jd}",
                    converter.name()
                );
                Outcome::Failed
            }
        }
        Err(error) => skipped_or_failed(converter, restricted, &error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always answers JD 0 and -4713-11-24, to prove the harness can fail.
    struct Stuck;

    impl CalendarConverter for Stuck {
        fn name(&self) -> &'static str {
            "stuck"
        }

        fn calendar_to_julian(&self, _: i32, _: u8, _: u8, _: f64) -> Result<JulianDate, ConversionError> {
            Ok(JulianDate::from_f64(0.0))
        }

        fn julian_to_calendar(&self, _: JulianDate) -> Result<CalendarDate, ConversionError> {
            CalendarDate::new(-4713, 11, 24, 0.5)
        }
    }

    #[test]
    fn test_published_cases_all_pass() {
        let harness = Harness::default();
        let tally = harness.check_published();
        assert_eq!(tally, Tally { passed: PUBLISHED_CASES.len() * 2 * 3, failed: 0, skipped: 0 });
    }

    #[test]
    fn test_published_cases_are_valid_dates() {
        for case in PUBLISHED_CASES {
            assert!(
                CalendarDate::new(case.year, case.month, case.day, case.fraction).is_ok(),
                "{}: {}-{}-{}",
                case.source,
                case.year,
                case.month,
                case.day
            );
        }
    }

    #[test]
    fn test_small_years_sweep() {
        let tally = Harness::default().sweep_years(SMALL_YEARS);
        // 22 years, 6 of them leap, 2 checks for each of 3 converters per day
        let days = 22 * 365 + 6;
        assert_eq!(tally, Tally { passed: days * 6, failed: 0, skipped: 0 });
    }

    #[test]
    fn test_sweep_before_reference_range_skips() {
        let tally = Harness::default().sweep_years(-4802..=-4800);
        assert!(tally.is_clean(), "{tally}");
        // -4800 is leap. The reference refuses these years as calendar input
        // but still accepts their Julian Dates.
        let days = 3 * 365 + 1;
        assert_eq!(tally, Tally { passed: days * 5, failed: 0, skipped: days });
    }

    #[test]
    fn test_sweep_across_cycle_boundaries() {
        let harness = Harness::default();
        for years in [-401..=-399, 399..=401, 1999..=2001] {
            let tally = harness.sweep_years(years.clone());
            assert_eq!(tally.failed, 0, "{years:?}: {tally}");
            assert_eq!(tally.skipped, 0, "{years:?}: {tally}");
        }
    }

    #[test]
    fn test_parallel_sweep_matches_serial() {
        let harness = Harness::default();
        let workers = NonZeroUsize::new(4).expect("non-zero");
        assert_eq!(harness.sweep_years_parallel(-30..=30, workers), harness.sweep_years(-30..=30));
        assert_eq!(harness.sweep_years_parallel(5..=6, workers), harness.sweep_years(5..=6));
    }

    #[test]
    fn test_run_is_clean() {
        let report = Harness::default().run();
        assert!(report.total().is_clean(), "{report}");
        assert_eq!(report.published, Harness::default().check_published());
    }

    #[test]
    fn test_year_blocks() {
        struct TestCase {
            years:       RangeInclusive<i32>,
            workers:     usize,
            blocks:      Vec<RangeInclusive<i32>>,
            description: &'static str,
        }

        let cases = [
            TestCase {
                years:       -30..=30,
                workers:     4,
                blocks:      vec![-30..=-15, -14..=1, 2..=17, 18..=30],
                description: "61 years on 4 workers",
            },
            TestCase {
                years:       1..=7,
                workers:     4,
                blocks:      vec![1..=2, 3..=4, 5..=6, 7..=7],
                description: "7 years on 4 workers",
            },
            TestCase {
                years:       5..=6,
                workers:     4,
                blocks:      vec![5..=5, 6..=6],
                description: "fewer years than workers",
            },
            TestCase {
                years:       i32::MIN..=i32::MAX,
                workers:     2,
                blocks:      vec![i32::MIN..=-1, 0..=i32::MAX],
                description: "whole i32 range",
            },
        ];

        for case in cases {
            let workers = NonZeroUsize::new(case.workers).expect("non-zero");
            let blocks = year_blocks(case.years, workers);
            assert!(blocks.len() <= case.workers, "{}", case.description);
            assert_eq!(blocks, case.blocks, "{}", case.description);
        }

        #[allow(clippy::reversed_empty_ranges)]
        let empty = year_blocks(3..=2, NonZeroUsize::MIN);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_empty_sweep() {
        #[allow(clippy::reversed_empty_ranges)]
        let tally = Harness::default().sweep_years(3..=2);
        assert_eq!(tally, Tally::default());
    }

    #[test]
    fn test_failures_are_counted() {
        let candidates: Vec<BoxedConverter> = vec![Box::new(Stuck)];
        let harness = Harness::with_candidates(ReferenceConverter::default(), candidates);
        assert_eq!(harness.converter_names(), ["reference", "stuck"]);

        let origin = PUBLISHED_CASES.iter().find(|c| c.source == ORIGIN).expect("origin case");
        assert_eq!(harness.check_both_directions(origin), Tally { passed: 4, failed: 0, skipped: 0 });

        let tally = harness.check_published();
        assert_eq!(tally.passed, PUBLISHED_CASES.len() * 2 + 2);
        assert_eq!(tally.failed, (PUBLISHED_CASES.len() - 1) * 2);
    }

    #[test]
    fn test_jan_0_of() {
        assert_eq!(jan_0_of(0), JAN_0_YEAR_0);
        assert_eq!(jan_0_of(1), JAN_0_YEAR_0 + 366.0);
        assert_eq!(jan_0_of(-1), JAN_0_YEAR_0 - 365.0);
        assert_eq!(jan_0_of(-9), JAN_0_YEAR_0 - 2.0 * 366.0 - 7.0 * 365.0);
        assert_eq!(jan_0_of(12), JAN_0_YEAR_0 + 3.0 * 366.0 + 9.0 * 365.0);
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.record(Outcome::Passed);
        tally.record(Outcome::Passed);
        tally.record(Outcome::Skipped);
        let mut other = Tally::default();
        other.record(Outcome::Failed);
        tally.merge(other);

        assert_eq!(tally, Tally { passed: 2, failed: 1, skipped: 1 });
        assert_eq!(tally.total(), 4);
        assert!(!tally.is_clean());
        assert_eq!(tally.to_string(), "2 passed, 1 failed, 1 skipped");
    }

    #[test]
    fn test_report() {
        let report = Report {
            published: Tally { passed: 3, failed: 0, skipped: 1 },
            sweep:     Tally { passed: 5, failed: 1, skipped: 0 },
        };
        assert_eq!(report.total(), Tally { passed: 8, failed: 1, skipped: 1 });
        assert_eq!(
            report.to_string(),
            "published cases: 3 passed, 0 failed, 1 skipped; year sweep: 5 passed, 1 failed, 0 skipped"
        );
    }
}
