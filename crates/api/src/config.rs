// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use shiftbook_domain::{BusinessClock, DEFAULT_BONUS_RATE, DEFAULT_TIMEZONE};

use crate::error::{ApiError, translate_domain_error};

/// Payroll settings shared by the store and the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    /// Rate applied per bonus-counter hit when settling a fortnight.
    pub bonus_rate: Decimal,
    /// IANA name of the business timezone.
    pub timezone: String,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            bonus_rate: DEFAULT_BONUS_RATE,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl PayrollConfig {
    /// Builds the business clock for the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the timezone is unknown.
    pub fn clock(&self) -> Result<BusinessClock, ApiError> {
        BusinessClock::new(&self.timezone).map_err(translate_domain_error)
    }
}
