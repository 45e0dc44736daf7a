//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the `created` column of
//! the node table, which holds seconds since the unix epoch.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix(1_584_189_000)?;
//! assert_eq!(dt.to_string(), "2020-03-14 12:30:00");
//! assert_eq!(dt.date_part(), "2020-03-14");
//! ```

use std::fmt;

use anyhow::{Result, bail};

const SECS_PER_DAY: i64 = 86_400;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Convert seconds since the unix epoch.
    ///
    /// Years outside `0..=9999` are rejected, they cannot be rendered as
    /// a four digit ISO date.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Ranges checked below
    pub fn from_unix(secs: i64) -> Result<Self> {
        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);

        let (year, month, day) = civil_from_days(days);
        if !(0..=9999).contains(&year) {
            bail!("timestamp {secs} is out of range");
        }

        Ok(Self::new(
            year as u16,
            month,
            day,
            (rem / 3600) as u8,
            ((rem / 60) % 60) as u8,
            (rem % 60) as u8,
        ))
    }

    /// Date portion only: `YYYY-MM-DD`.
    pub fn date_part(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Renders as `YYYY-MM-DD HH:MM:SS`.
impl fmt::Display for DateTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Days since 1970-01-01 to (year, month, day) in the proleptic Gregorian calendar.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097); // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unix_epoch() {
        let dt = DateTimeUtc::from_unix(0).unwrap();
        assert_eq!(dt, DateTimeUtc::new(1970, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_from_unix_known_date() {
        // 2020-03-14 12:30:00 UTC
        let dt = DateTimeUtc::from_unix(1_584_189_000).unwrap();
        assert_eq!(dt, DateTimeUtc::new(2020, 3, 14, 12, 30, 0));
        assert_eq!(dt.date_part(), "2020-03-14");
        assert_eq!(dt.to_string(), "2020-03-14 12:30:00");
    }

    #[test]
    fn test_from_unix_leap_day() {
        // 2024-02-29 23:59:59 UTC
        let dt = DateTimeUtc::from_unix(1_709_251_199).unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn test_from_unix_before_epoch() {
        // 1969-12-31 23:59:59 UTC
        let dt = DateTimeUtc::from_unix(-1).unwrap();
        assert_eq!(dt, DateTimeUtc::new(1969, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_from_unix_out_of_range() {
        assert!(DateTimeUtc::from_unix(i64::MAX / 2).is_err());
    }

    #[test]
    fn test_display_pads_fields() {
        let dt = DateTimeUtc::new(2009, 7, 4, 5, 6, 7);
        assert_eq!(dt.to_string(), "2009-07-04 05:06:07");
    }
}
