use crate::ConversionError;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// 2^63: the smallest magnitude whose rounded value does not fit in `i64`.
const I64_DAY_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A Julian Date held as two parts whose sum is the date.
///
/// Any split is accepted: `(2400000.5, 50123.9999)`, `(2450123.9999, 0.0)`
/// and `(0.0, 2450123.9999)` all name the same instant. Converters refuse a
/// part of magnitude 2^63 or more, even when the sum is in range. Converters in this
/// crate produce the day number at 0h in `jd1` and the day fraction in `jd2`.
#[derive(Debug, Clone, Copy, PartialEq, Display, Serialize, Deserialize)]
#[display(fmt = "JD {:.9}", "jd1 + jd2")]
pub struct JulianDate {
    pub jd1: f64,
    pub jd2: f64,
}

/// A Julian Date normalized to a whole day and the time elapsed since 0h of that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitDay {
    /// Noon-based Julian Day Number: the civil day starts at `jdn - 0.5`.
    pub jdn:      i64,
    /// Fraction of the civil day elapsed since 0h, in `[0, 1)`.
    pub fraction: f64,
}

impl JulianDate {
    pub const fn new(jd1: f64, jd2: f64) -> Self {
        Self { jd1, jd2 }
    }

    pub const fn from_f64(jd: f64) -> Self {
        Self::new(jd, 0.0)
    }

    pub const fn jd1(&self) -> f64 {
        self.jd1
    }

    pub const fn jd2(&self) -> f64 {
        self.jd2
    }

    pub fn to_f64(&self) -> f64 {
        self.jd1 + self.jd2
    }

    pub fn add_days(&self, days: f64) -> Self {
        Self::new(self.jd1, self.jd2 + days)
    }

    /// Rejects a date whose sum is not finite or lies outside `[min, max]`,
    /// or with a part too large for its whole days to be counted in `i64`.
    ///
    /// # Errors
    /// Returns `ConversionError::OutOfRange` when the check fails.
    pub fn check_range(&self, min: f64, max: f64) -> Result<(), ConversionError> {
        let jd = self.to_f64();
        let parts_fit = self.jd1.abs() < I64_DAY_LIMIT && self.jd2.abs() < I64_DAY_LIMIT;
        if !parts_fit || !jd.is_finite() || jd < min || jd > max {
            return Err(ConversionError::OutOfRange { jd, min, max });
        }
        Ok(())
    }

    /// Splits the two parts into a whole day number and a day fraction.
    ///
    /// Each part is rounded to the nearest integer separately and the two
    /// residuals are summed with 0.5 using compensated summation (Klein 2006),
    /// so the rounding error of `jd1 + jd2` cannot move the day boundary.
    /// The caller must have range-checked the date first.
    pub fn split_day(&self) -> SplitDay {
        let d1 = self.jd1.round();
        let d2 = self.jd2.round();
        let mut jdn = d1 as i64 + d2 as i64;

        let mut s = 0.5_f64;
        let mut cs = 0.0_f64;
        for x in [self.jd1 - d1, self.jd2 - d2] {
            let t = s + x;
            cs += if s.abs() >= x.abs() { (s - t) + x } else { (x - t) + s };
            s = t;
            if s >= 1.0 {
                jdn += 1;
                s -= 1.0;
            }
        }
        let mut f = s + cs;
        cs = f - s;

        if f < 0.0 {
            f = s + 1.0;
            cs += (1.0 - f) + s;
            s = f;
            f = s + cs;
            cs = f - s;
            jdn -= 1;
        }

        // f may round to 1.0 even though the exact sum is just below it
        if (f - 1.0) >= -f64::EPSILON / 4.0 {
            let t = s - 1.0;
            cs += (s - t) - 1.0;
            s = t;
            f = s + cs;
            if -f64::EPSILON / 2.0 < f {
                jdn += 1;
                f = f.max(0.0);
            }
        }

        SplitDay { jdn, fraction: f }
    }
}

impl From<f64> for JulianDate {
    fn from(jd: f64) -> Self {
        Self::from_f64(jd)
    }
}
