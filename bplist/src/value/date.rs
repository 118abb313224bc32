/*!
 Dates stored in a property list.

 Apple stores dates as a number of seconds since `2001-01-01 00:00:00 UTC`, the reference date used by
 [`CFAbsoluteTime`](https://developer.apple.com/documentation/corefoundation/cfabsolutetime).
*/

use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and `2001-01-01 00:00:00 UTC`
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// A point in time stored as seconds relative to the Apple reference date
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Date {
    seconds: f64,
}

impl Date {
    /// Create a date from seconds since `2001-01-01 00:00:00 UTC`
    pub fn from_seconds_since_reference(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Seconds since `2001-01-01 00:00:00 UTC`; negative for earlier dates
    pub fn seconds_since_reference(&self) -> f64 {
        self.seconds
    }

    /// Convert to a [`DateTime`], if the stored value is finite and in range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.seconds.is_finite() {
            return None;
        }
        let whole = self.seconds.floor();
        let nanos = ((self.seconds - whole) * 1_000_000_000.0).round() as u32;
        // Rounding can carry a full second
        let (whole, nanos) = if nanos >= 1_000_000_000 {
            (whole + 1.0, 0)
        } else {
            (whole, nanos)
        };
        if whole.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp((whole as i64).checked_add(APPLE_EPOCH_OFFSET)?, nanos)
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(date: DateTime<Utc>) -> Self {
        let whole = (date.timestamp() - APPLE_EPOCH_OFFSET) as f64;
        let fraction = date.timestamp_subsec_nanos() as f64 / 1_000_000_000.0;
        Self::from_seconds_since_reference(whole + fraction)
    }
}

impl Display for Date {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self.to_datetime() {
            Some(date) => write!(fmt, "{}", date.to_rfc3339()),
            None => write!(fmt, "{} seconds since 2001-01-01", self.seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::value::date::{Date, APPLE_EPOCH_OFFSET};

    #[test]
    fn can_match_reference_date() {
        let reference = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(reference.timestamp(), APPLE_EPOCH_OFFSET);
        assert_eq!(Date::from(reference).seconds_since_reference(), 0.0);
    }

    #[test]
    fn can_convert_to_datetime() {
        let date = Date::from_seconds_since_reference(86400.5);
        let expected = Utc.with_ymd_and_hms(2001, 1, 2, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(500);
        assert_eq!(date.to_datetime(), Some(expected));
    }

    #[test]
    fn can_convert_before_reference() {
        let expected = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let date = Date::from(expected);
        assert_eq!(date.seconds_since_reference(), -978_307_200.0);
        assert_eq!(date.to_datetime(), Some(expected));
    }

    #[test]
    fn cant_convert_non_finite() {
        assert!(Date::from_seconds_since_reference(f64::NAN)
            .to_datetime()
            .is_none());
        assert!(Date::from_seconds_since_reference(f64::INFINITY)
            .to_datetime()
            .is_none());
    }

    #[test]
    fn can_display_date() {
        let date = Date::from_seconds_since_reference(0.0);
        assert_eq!(date.to_string(), "2001-01-01T00:00:00+00:00");
    }
}
