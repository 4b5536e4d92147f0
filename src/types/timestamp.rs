use std::{fmt::Display, str::FromStr};

use crate::result::{err_msg, Error, Result};

/// A position in a media stream, second precision.
///
/// Immutable once constructed. The canonical textual form is zero-padded
/// `HH:MM:SS`, and because every field is fixed-width and range-bounded,
/// the derived field-order comparison matches the lexicographic order of
/// that canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    hour: u8,
    minute: u8,
    second: u8,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build a timestamp from its components.
    /// Hours are bounded to a day, minutes and seconds to their usual range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        if hour > 23 {
            return Err(err_msg(format!("Hours out of range: {hour}")));
        }
        if minute > 59 || second > 59 {
            return Err(err_msg(format!(
                "Minutes/seconds out of range: {minute}:{second}"
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Canonical form with `:` replaced by `-`, safe for file names.
    pub fn dashed(self) -> String {
        format!("{:02}-{:02}-{:02}", self.hour, self.minute, self.second)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let mut next = || -> Result<u8> {
            let part = parts
                .next()
                .ok_or_else(|| err_msg(format!("Expected HH:MM:SS, got '{s}'")))?;
            part.parse()
                .map_err(|_| err_msg(format!("Invalid timestamp field '{part}' in '{s}'")))
        };

        let (hour, minute, second) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err_msg(format!("Expected HH:MM:SS, got '{s}'")));
        }
        Timestamp::new(hour, minute, second)
    }
}

/// Render a scalar duration in the canonical `HH:MM:SS` form.
/// An unknown duration renders as a placeholder instead of failing.
pub fn format_duration(total_seconds: Option<u64>) -> String {
    match total_seconds {
        Some(total) => format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        ),
        None => "–".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_zero_padded() {
        let all_valid = (0u8..24).flat_map(|h| [(h, 0, 0), (h, 59, 59), (h, 9, 30)]);

        for (h, m, s) in all_valid {
            let tstamp = Timestamp::new(h, m, s).unwrap();
            let text = tstamp.to_string();
            assert_eq!(text, format!("{h:02}:{m:02}:{s:02}"));
            assert_eq!(text.len(), 8);
        }
    }

    #[test]
    fn ordering_matches_canonical_text() {
        let a = Timestamp::new(0, 59, 59).unwrap();
        let b = Timestamp::new(1, 0, 0).unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        assert!(Timestamp::new(24, 0, 0).is_err());
        assert!(Timestamp::new(0, 60, 0).is_err());
        assert!(Timestamp::new(0, 0, 60).is_err());
    }

    #[test]
    fn parse_roundtrip() {
        let tstamp: Timestamp = "01:02:03".parse().unwrap();
        assert_eq!(tstamp, Timestamp::new(1, 2, 3).unwrap());
        assert_eq!(tstamp.to_string(), "01:02:03");

        assert!("1:2".parse::<Timestamp>().is_err());
        assert!("01:02:03:04".parse::<Timestamp>().is_err());
        assert!("aa:bb:cc".parse::<Timestamp>().is_err());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Some(0)), "00:00:00");
        assert_eq!(format_duration(Some(3671)), "01:01:11");
        assert_eq!(format_duration(Some(10 * 3600)), "10:00:00");
        assert_eq!(format_duration(None), "–");
    }
}
