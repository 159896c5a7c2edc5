// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Half-month payroll calendar.
//!
//! ## Invariants
//!
//! - Half 1 covers days 1-15 and is paid on the 16th of the same month
//! - Half 2 covers day 16 through month end and is paid on the 1st of the
//!   following month (December rolls into January of the next year)
//! - Every date belongs to exactly one period

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// Last day of the first half.
const FIRST_HALF_LAST_DAY: u8 = 15;

/// Which half of the month a period covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Half {
    /// Days 1-15.
    First,
    /// Day 16 to month end.
    Second,
}

impl Half {
    /// Returns 1 or 2.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    /// Parses 1 or 2.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHalf` for any other value.
    pub const fn from_number(value: u8) -> Result<Self, DomainError> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(DomainError::InvalidHalf(other)),
        }
    }
}

/// A (year, month, half) payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FortnightPeriod {
    year: i32,
    month: Month,
    half: Half,
}

impl FortnightPeriod {
    /// Creates a period from raw numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is outside 1..=12 or `half` is not 1 or 2.
    pub fn new(year: i32, month: u8, half: u8) -> Result<Self, DomainError> {
        let month: Month = Month::try_from(month).map_err(|_| DomainError::InvalidMonth(month))?;
        Ok(Self {
            year,
            month,
            half: Half::from_number(half)?,
        })
    }

    /// The period a date falls into.
    #[must_use]
    pub const fn containing(date: Date) -> Self {
        let half: Half = if date.day() <= FIRST_HALF_LAST_DAY {
            Half::First
        } else {
            Half::Second
        };
        Self {
            year: date.year(),
            month: date.month(),
            half,
        }
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }

    /// Month as 1..=12.
    #[must_use]
    pub const fn month_number(&self) -> u8 {
        self.month as u8
    }

    #[must_use]
    pub const fn half(&self) -> Half {
        self.half
    }

    /// First day covered by the period.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented.
    pub fn start_date(&self) -> Result<Date, DomainError> {
        let day: u8 = match self.half {
            Half::First => 1,
            Half::Second => FIRST_HALF_LAST_DAY + 1,
        };
        build_date(self.year, self.month, day)
    }

    /// Last day covered by the period.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented.
    pub fn end_date(&self) -> Result<Date, DomainError> {
        match self.half {
            Half::First => build_date(self.year, self.month, FIRST_HALF_LAST_DAY),
            Half::Second => last_day_of_month(self.year, self.month),
        }
    }

    /// When the period is paid out.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented.
    pub fn payment_date(&self) -> Result<Date, DomainError> {
        match self.half {
            Half::First => build_date(self.year, self.month, FIRST_HALF_LAST_DAY + 1),
            Half::Second => first_day_of_next_month(self.year, self.month),
        }
    }

    /// Whether `date` falls inside this period.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        Self::containing(date) == *self
    }
}

impl std::fmt::Display for FortnightPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:02} H{}",
            self.year,
            self.month_number(),
            self.half.number()
        )
    }
}

/// First and last day of the calendar month before the one containing `date`.
///
/// Used as the trailing window for commission tier resolution.
///
/// # Errors
///
/// Returns an error if the dates cannot be represented.
pub fn previous_month_range(date: Date) -> Result<(Date, Date), DomainError> {
    let first_of_month: Date = build_date(date.year(), date.month(), 1)?;
    let last_of_previous: Date =
        first_of_month
            .previous_day()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("day before {first_of_month}"),
            })?;
    let first_of_previous: Date =
        build_date(last_of_previous.year(), last_of_previous.month(), 1)?;
    Ok((first_of_previous, last_of_previous))
}

/// First and last day of a calendar month.
///
/// # Errors
///
/// Returns `DomainError::InvalidMonth` if `month` is not in 1..=12, or an
/// error if the dates cannot be represented.
pub fn month_range(year: i32, month: u8) -> Result<(Date, Date), DomainError> {
    let month: Month = Month::try_from(month).map_err(|_| DomainError::InvalidMonth(month))?;
    Ok((build_date(year, month, 1)?, last_day_of_month(year, month)?))
}

fn build_date(year: i32, month: Month, day: u8) -> Result<Date, DomainError> {
    Date::from_calendar_date(year, month, day).map_err(|e| DomainError::DateArithmeticOverflow {
        operation: format!("{year}-{month}-{day}: {e}"),
    })
}

fn first_day_of_next_month(year: i32, month: Month) -> Result<Date, DomainError> {
    if month == Month::December {
        let next_year: i32 =
            year.checked_add(1)
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("year after {year}"),
                })?;
        build_date(next_year, Month::January, 1)
    } else {
        build_date(year, month.next(), 1)
    }
}

fn last_day_of_month(year: i32, month: Month) -> Result<Date, DomainError> {
    let next: Date = first_day_of_next_month(year, month)?;
    next.previous_day()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("day before {next}"),
        })
}
