//! Error type
//!
//! Only parameter validation fails. Spectral analysis and metric extraction
//! are total and report degenerate results as `±∞` or `0.0` instead.

use thiserror::Error;

/// Error returned when parameters are rejected before any computation
#[derive(Debug, Error)]
pub enum Error {
    /// Parameter outside of its valid domain
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// Offending value (rendered for display)
        value: String,
        /// Constraint which was violated
        reason: &'static str,
    },
    /// Sweep configuration could not be parsed
    #[error("invalid sweep configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Check that a real parameter is finite and strictly positive
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must be finite and greater than zero"))
    }
}

/// Check that a real parameter is finite and not negative
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must be finite and not negative"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_require_positive() {
        assert!(require_positive("sample_rate", 1.0).is_ok());
        assert!(require_positive("sample_rate", 0.0).is_err());
        assert!(require_positive("sample_rate", -3.0).is_err());
        assert!(require_positive("sample_rate", f64::NAN).is_err());
        assert!(require_positive("sample_rate", f64::INFINITY).is_err());
    }
    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("noise_std", 0.0).is_ok());
        assert!(require_non_negative("noise_std", -1e-9).is_err());
    }
    #[test]
    fn test_display() {
        let err = Error::invalid("bits", 0, "must be at least 1");
        assert_eq!(err.to_string(), "invalid parameter `bits` = 0: must be at least 1");
    }
}
