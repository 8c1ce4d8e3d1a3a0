use crate::ConversionError;
use crate::consts::{DEFAULT_JULIAN_DATE_CEILING, MAX_JULIAN_DATE_CEILING};
use serde::{Deserialize, Serialize};

/// Settings shared by the converters.
///
/// The ceiling is a sanity bound on `|jd1 + jd2|`, not a calendar limit:
/// it keeps the whole-day count well inside `i64` and the year inside `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    julian_date_ceiling: f64,
}

impl ConverterConfig {
    /// Creates a config with the given Julian Date ceiling.
    ///
    /// # Errors
    /// Returns `ConversionError::InvalidConfig` if the ceiling is not in `(0, MAX_JULIAN_DATE_CEILING]`.
    pub fn new(julian_date_ceiling: f64) -> Result<Self, ConversionError> {
        let config = Self { julian_date_ceiling };
        config.validate()?;
        Ok(config)
    }

    pub const fn julian_date_ceiling(&self) -> f64 {
        self.julian_date_ceiling
    }

    /// Checks a config obtained through deserialization.
    ///
    /// # Errors
    /// Returns `ConversionError::InvalidConfig` if the ceiling is not in `(0, MAX_JULIAN_DATE_CEILING]`.
    pub fn validate(&self) -> Result<(), ConversionError> {
        let ceiling = self.julian_date_ceiling;
        if !ceiling.is_finite() || ceiling <= 0.0 || ceiling > MAX_JULIAN_DATE_CEILING {
            return Err(ConversionError::InvalidConfig(format!(
                "julian_date_ceiling must be in (0, {MAX_JULIAN_DATE_CEILING:e}], got {ceiling}"
            )));
        }
        Ok(())
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            julian_date_ceiling: DEFAULT_JULIAN_DATE_CEILING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling() {
        assert_eq!(ConverterConfig::default().julian_date_ceiling(), 1e9);
    }

    #[test]
    fn test_new_rejects_bad_ceiling() {
        assert!(ConverterConfig::new(5e8).is_ok());
        for bad in [0.0, -1.0, 1e12, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(ConverterConfig::new(bad), Err(ConversionError::InvalidConfig(_))),
                "ceiling {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ConverterConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(config, ConverterConfig::default());

        let config: ConverterConfig =
            serde_json::from_str(r#"{"julian_date_ceiling": 3.5e6}"#).expect("explicit ceiling");
        assert_eq!(config.julian_date_ceiling(), 3.5e6);
        assert!(config.validate().is_ok());

        let config: ConverterConfig =
            serde_json::from_str(r#"{"julian_date_ceiling": -2.0}"#).expect("parses before validation");
        assert!(config.validate().is_err());
    }
}
