//! Wall-clock arithmetic on `HH:MM` strings.
//!
//! Times are carried as minutes since midnight. Formatting reduces modulo one
//! day, so a schedule that runs past midnight wraps to `00:00`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors from parsing an `HH:MM` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("time {0:?} is missing the ':' separator (expected HH:MM)")]
    MissingSeparator(String),

    #[error("time {0:?} must have exactly two fields (expected HH:MM)")]
    FieldCount(String),

    #[error("time {0:?} has a non-numeric field (expected HH:MM)")]
    NotNumeric(String),

    #[error("hour {hour} in {input:?} is out of range (expected 0-23)")]
    HourOutOfRange { input: String, hour: u32 },

    #[error("minute {minute} in {input:?} is out of range (expected 0-59)")]
    MinuteOutOfRange { input: String, minute: u32 },
}

/// A time of day, stored as minutes since midnight (`0..1440`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Parse an `HH:MM` string.
    ///
    /// Each field may be one or two ASCII digits, so `"9:00"` is accepted and
    /// reads as `09:00`. Signs, whitespace, empty fields and fields longer
    /// than two digits are rejected.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        if !input.contains(':') {
            return Err(FormatError::MissingSeparator(input.to_owned()));
        }

        let fields: Vec<&str> = input.split(':').collect();
        let [hour, minute] = fields.as_slice() else {
            return Err(FormatError::FieldCount(input.to_owned()));
        };

        let hour = parse_field(hour).ok_or_else(|| FormatError::NotNumeric(input.to_owned()))?;
        let minute =
            parse_field(minute).ok_or_else(|| FormatError::NotNumeric(input.to_owned()))?;

        if hour > 23 {
            return Err(FormatError::HourOutOfRange {
                input: input.to_owned(),
                hour,
            });
        }
        if minute > 59 {
            return Err(FormatError::MinuteOutOfRange {
                input: input.to_owned(),
                minute,
            });
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Build from a raw minute count, reducing modulo one day.
    pub fn from_minutes(minutes: u64) -> Self {
        Self((minutes % u64::from(MINUTES_PER_DAY)) as u32)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Minutes from `self` forward to `later`, wrapping past midnight.
    pub fn minutes_until(self, later: ClockTime) -> u32 {
        (later.0 + MINUTES_PER_DAY - self.0) % MINUTES_PER_DAY
    }
}

/// One or two ASCII digits.
fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Format a raw minute offset as `HH:MM`, wrapping past midnight.
pub fn format_minutes(minutes: u64) -> String {
    ClockTime::from_minutes(minutes).to_string()
}
