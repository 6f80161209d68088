//! Station code types.

use std::fmt;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A transit feed station code, e.g. `NY` or `ST`.
///
/// Codes are 1 to 4 ASCII alphanumeric characters. Lowercase input is
/// accepted and normalised to uppercase, so a `StationCode` always compares
/// equal to the directory key it was parsed from.
///
/// # Examples
///
/// ```
/// use delay_notifier::domain::StationCode;
///
/// let ny = StationCode::parse("NY").unwrap();
/// assert_eq!(ny.as_str(), "NY");
///
/// // Lowercase is normalised
/// assert_eq!(StationCode::parse("st").unwrap().as_str(), "ST");
///
/// // Empty and overlong codes are rejected
/// assert!(StationCode::parse("").is_err());
/// assert!(StationCode::parse("NEWARK").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StationCode(String);

impl StationCode {
    /// Maximum code length seen in the feed.
    pub const MAX_LEN: usize = 4;

    /// Parse a station code, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStationCode {
                reason: "must not be empty",
            });
        }

        if s.len() > Self::MAX_LEN {
            return Err(InvalidStationCode {
                reason: "must be at most 4 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidStationCode {
                reason: "must be ASCII letters or digits",
            });
        }

        Ok(StationCode(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
