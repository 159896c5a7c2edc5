// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{at, date};
use crate::{BusinessClock, DomainError, format_date, format_datetime, parse_date, parse_datetime};

#[test]
fn test_clock_converts_to_new_york_wall_time() {
    let clock: BusinessClock = BusinessClock::new("America/New_York").unwrap();
    // 2026-01-15 14:30:00 UTC is 09:30 EST.
    let local = clock.local_from_unix(1_768_487_400).unwrap();
    assert_eq!(local, at(date(2026, 1, 15), 9, 30));
}

#[test]
fn test_clock_rejects_unknown_timezone() {
    assert_eq!(
        BusinessClock::new("Mars/Olympus"),
        Err(DomainError::InvalidTimezone(String::from("Mars/Olympus")))
    );
}

#[test]
fn test_date_formats() {
    assert_eq!(format_date(date(2026, 3, 5)), "2026-03-05");
    assert_eq!(parse_date("2026-03-05").unwrap(), date(2026, 3, 5));
    assert!(parse_date("03/05/2026").is_err());
}

#[test]
fn test_datetime_formats() {
    let value = at(date(2026, 3, 5), 7, 45);
    assert_eq!(format_datetime(value), "2026-03-05 07:45:00");
    assert_eq!(parse_datetime("2026-03-05 07:45:00").unwrap(), value);
    assert!(parse_datetime("2026-03-05T07:45:00").is_err());
}
