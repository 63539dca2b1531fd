//! Free-form duration parsing.
//!
//! Task durations arrive as user-typed strings like `"30min"`, `"1.5h"` or
//! `"2km"`. Time-based values canonicalize to whole minutes. Unit-based
//! values (`pcs`, `m`, `km`, `l`) matter only for their *kind*: the literal
//! quantity plays no role in cooldown math.

use serde::{Deserialize, Serialize};

use crate::error::DurationError;

/// Minutes recorded in the completion log for a non-time-based task.
pub const NON_TIME_MINUTES: u32 = 1;

/// Canonical form of a task duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSpec {
    /// Time-based duration in whole minutes.
    Minutes(u32),
    /// Unit-based duration (pieces, meters, kilometers, liters).
    NonTime,
}

impl DurationSpec {
    /// Parse a user-entered duration string.
    ///
    /// Accepted shapes, case-insensitive, surrounding whitespace ignored:
    /// `<number>h` and `<number>min` with a decimal number (`.` or `,`),
    /// and `<number>{pcs|m|km|l}` with an integer quantity. Time values
    /// round down to whole minutes.
    pub fn parse(raw: &str) -> Result<Self, DurationError> {
        let d = raw.trim().to_lowercase();

        // "min" before "m": "30min" must not be read as meters.
        if let Some(num) = d.strip_suffix("min") {
            let minutes = parse_decimal(num).ok_or_else(|| invalid(raw))?;
            return Ok(DurationSpec::Minutes(minutes as u32));
        }
        if let Some(num) = d.strip_suffix('h') {
            let hours = parse_decimal(num).ok_or_else(|| invalid(raw))?;
            return Ok(DurationSpec::Minutes((hours * 60.0) as u32));
        }
        // "km" before "m": stripping "m" off "2km" would leave "2k".
        for unit in ["pcs", "km", "l", "m"] {
            if let Some(num) = d.strip_suffix(unit) {
                if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(DurationSpec::NonTime);
                }
                return Err(invalid(raw));
            }
        }
        Err(invalid(raw))
    }

    /// Canonical minutes for this duration.
    pub fn minutes(&self) -> u32 {
        match self {
            DurationSpec::Minutes(m) => *m,
            DurationSpec::NonTime => NON_TIME_MINUTES,
        }
    }

    /// Whether this duration is unit-based rather than time-based.
    pub fn is_non_time(&self) -> bool {
        matches!(self, DurationSpec::NonTime)
    }
}

fn invalid(raw: &str) -> DurationError {
    DurationError::InvalidFormat(raw.to_string())
}

/// Parse a non-negative decimal that may use `,` as the decimal separator.
fn parse_decimal(s: &str) -> Option<f64> {
    let value: f64 = s.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes() {
        assert_eq!(DurationSpec::parse("30min"), Ok(DurationSpec::Minutes(30)));
        assert_eq!(DurationSpec::parse(" 45MIN "), Ok(DurationSpec::Minutes(45)));
        assert_eq!(DurationSpec::parse("2.5min"), Ok(DurationSpec::Minutes(2)));
    }

    #[test]
    fn parses_hours_to_minutes() {
        assert_eq!(DurationSpec::parse("2h"), Ok(DurationSpec::Minutes(120)));
        assert_eq!(DurationSpec::parse("1.5h"), Ok(DurationSpec::Minutes(90)));
        assert_eq!(DurationSpec::parse("1,5h"), Ok(DurationSpec::Minutes(90)));
        assert_eq!(DurationSpec::parse("0.25H"), Ok(DurationSpec::Minutes(15)));
    }

    #[test]
    fn parses_non_time_units() {
        for raw in ["3pcs", "2km", "5m", "1l", "10PCS"] {
            assert_eq!(DurationSpec::parse(raw), Ok(DurationSpec::NonTime), "{raw}");
        }
        assert_eq!(DurationSpec::parse("3pcs").unwrap().minutes(), NON_TIME_MINUTES);
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "abc", "h", "min", "pcs", "10", "10d", "x5min", "1..5h", "-1h"] {
            assert_eq!(
                DurationSpec::parse(raw),
                Err(DurationError::InvalidFormat(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn rejects_decimal_quantity_on_unit_durations() {
        assert!(DurationSpec::parse("1.5pcs").is_err());
        assert!(DurationSpec::parse("2,5km").is_err());
    }
}
