// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Business wall clock and textual date formats.
//!
//! Shift times are wall-clock times in the business timezone. They are
//! stored without an offset and formatted as `YYYY-MM-DD HH:MM:SS`.

use crate::error::DomainError;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

const DATE_FORMAT: &[time::format_description::FormatItem<'_>] =
    time::macros::format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[time::format_description::FormatItem<'_>] =
    time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Converts instants to wall-clock time in the business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    tz: Tz,
}

impl BusinessClock {
    /// Creates a clock for an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the name is unknown.
    pub fn new(timezone: &str) -> Result<Self, DomainError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self { tz })
    }

    /// The configured timezone name.
    #[must_use]
    pub fn timezone(&self) -> &'static str {
        self.tz.name()
    }

    /// Current wall-clock time, truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the local time cannot be represented.
    pub fn now(&self) -> Result<PrimitiveDateTime, DomainError> {
        self.local_from_utc(Utc::now())
    }

    /// Wall-clock time for a unix timestamp (seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp is out of range.
    pub fn local_from_unix(&self, seconds: i64) -> Result<PrimitiveDateTime, DomainError> {
        let utc: DateTime<Utc> =
            DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                DomainError::DateArithmeticOverflow {
                    operation: format!("timestamp {seconds}"),
                }
            })?;
        self.local_from_utc(utc)
    }

    fn local_from_utc(&self, utc: DateTime<Utc>) -> Result<PrimitiveDateTime, DomainError> {
        let naive: NaiveDateTime = utc.with_timezone(&self.tz).naive_local();
        naive_to_primitive(naive)
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
        }
    }
}

fn naive_to_primitive(naive: NaiveDateTime) -> Result<PrimitiveDateTime, DomainError> {
    let overflow = |what: &str| DomainError::DateArithmeticOverflow {
        operation: format!("{what} of {naive}"),
    };
    let month: u8 = u8::try_from(naive.month()).map_err(|_| overflow("month"))?;
    let month: Month = Month::try_from(month).map_err(|_| overflow("month"))?;
    let day: u8 = u8::try_from(naive.day()).map_err(|_| overflow("day"))?;
    let date: Date = Date::from_calendar_date(naive.year(), month, day)
        .map_err(|_| overflow("date"))?;
    let time: Time = Time::from_hms(
        u8::try_from(naive.hour()).map_err(|_| overflow("hour"))?,
        u8::try_from(naive.minute()).map_err(|_| overflow("minute"))?,
        u8::try_from(naive.second()).map_err(|_| overflow("second"))?,
    )
    .map_err(|_| overflow("time"))?;
    Ok(PrimitiveDateTime::new(date, time))
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the input is malformed.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_datetime(value: PrimitiveDateTime) -> String {
    value
        .format(DATETIME_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the input is malformed.
pub fn parse_datetime(value: &str) -> Result<PrimitiveDateTime, DomainError> {
    PrimitiveDateTime::parse(value.trim(), DATETIME_FORMAT).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}
