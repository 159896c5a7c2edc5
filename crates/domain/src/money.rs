// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monetary helpers.
//!
//! All amounts are `Decimal`. Persisted and reported figures are rounded to
//! two places, midpoint away from zero.

use crate::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places kept for money, hours and averages.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Share of gross sales that counts toward commission (0.8).
pub const NET_SALES_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Default fortnight bonus rate applied per bonus-counter hit (0.01).
pub const DEFAULT_BONUS_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds a value to two decimal places, midpoint away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a decimal amount from its textual form.
///
/// # Errors
///
/// Returns `DomainError::AmountParseError` if the string is not a decimal.
pub fn parse_amount(value: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(value.trim()).map_err(|e| DomainError::AmountParseError {
        amount_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Rejects negative amounts.
///
/// # Errors
///
/// Returns `DomainError::NegativeAmount` if `amount` is below zero.
pub fn require_non_negative(field: &str, amount: Decimal) -> Result<(), DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::NegativeAmount {
            field: field.to_string(),
            amount,
        });
    }
    Ok(())
}
