/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month
pub const MIN_DAY: u8 = 1;
/// Last day of the longest months
pub const MAX_DAY: u8 = 31;

/// Month number for January
pub const JANUARY: u8 = 1;
/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for December
pub const DECEMBER: u8 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Days in the months preceding each month of a non-leap year (index 0 is January).
pub const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Length of a common year
pub const COMMON_YEAR_DAYS: i64 = 365;
/// Length of a leap year
pub const LEAP_YEAR_DAYS: i64 = 366;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i64 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i64 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub const GREGORIAN_CYCLE_YEARS: i64 = 400;

/// Days in one full Gregorian cycle: 303 common years and 97 leap years.
pub const GREGORIAN_CYCLE_DAYS: i64 = COMMON_YEAR_DAYS * GREGORIAN_CYCLE_YEARS
    + GREGORIAN_CYCLE_YEARS / LEAP_YEAR_CYCLE
    - GREGORIAN_CYCLE_YEARS / CENTURY_CYCLE
    + 1;

/// Julian Date of January 0.0 of year 0 (December 31, year -1, at 0h).
pub const JAN_0_YEAR_0: f64 = 1_721_058.5;

/// Noon-based integer Julian Day Number of January 1, year 0.
pub(crate) const JAN_1_YEAR_0_JDN: i64 = 1_721_060;

/// Default upper bound on the magnitude of an accepted Julian Date.
pub const DEFAULT_JULIAN_DATE_CEILING: f64 = 1e9;

/// Largest ceiling a config may set; every year it reaches still fits in `i32`.
pub const MAX_JULIAN_DATE_CEILING: f64 = 1e11;

/// Modified Julian Date zero point, used by the reference converter.
pub const MJD_ZERO_POINT: f64 = 2_400_000.5;

/// Earliest calendar year the reference converter accepts.
pub const REFERENCE_EARLIEST_YEAR: i32 = -4799;

/// Earliest Julian Date the reference converter accepts.
pub const REFERENCE_EARLIEST_JD: f64 = -68_569.5;

/// Upper bound on loop steps in one inverse search: 2 year advances plus 12 month probes.
pub const MAX_SEARCH_STEPS: usize = 14;

/// Date component separator
pub const DATE_SEPARATOR: char = '-';
/// Separator between a date and its day fraction in text form
pub const FRACTION_SEPARATOR: char = '+';
