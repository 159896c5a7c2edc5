// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::money::require_non_negative;
use crate::types::{ActiveBonus, Employee, ProductSale};
use std::collections::HashSet;
use time::PrimitiveDateTime;

/// Validates an employee's field constraints.
///
/// # Arguments
///
/// * `employee` - The employee to validate
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The hourly wage is negative
/// - The commission override is negative
/// - The bonus balance is negative
pub fn validate_employee_fields(employee: &Employee) -> Result<(), DomainError> {
    // Rule: name must not be empty
    if employee.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }

    require_non_negative("hourly_wage", employee.hourly_wage)?;
    if let Some(pct) = employee.commission_override_pct {
        require_non_negative("commission_override_pct", pct)?;
    }
    require_non_negative("bonus_balance", employee.bonus_balance)?;

    Ok(())
}

/// Validates that clock-out is strictly after clock-in.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeRange` otherwise.
pub fn validate_time_range(
    clock_in: PrimitiveDateTime,
    clock_out: PrimitiveDateTime,
) -> Result<(), DomainError> {
    if clock_out <= clock_in {
        return Err(DomainError::InvalidTimeRange {
            clock_in,
            clock_out,
        });
    }
    Ok(())
}

/// Validates the product lines of a shift.
///
/// # Arguments
///
/// * `product_sales` - The product lines to validate
///
/// # Errors
///
/// Returns an error if:
/// - A product name is empty
/// - A product appears more than once
/// - An amount is negative
pub fn validate_product_sales(product_sales: &[ProductSale]) -> Result<(), DomainError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for sale in product_sales {
        let product: &str = sale.product.trim();
        if product.is_empty() {
            return Err(DomainError::EmptyProductName);
        }
        if !seen.insert(product) {
            return Err(DomainError::DuplicateProduct(product.to_string()));
        }
        require_non_negative(product, sale.amount)?;
    }

    Ok(())
}

/// Validates a bonus before it is granted.
///
/// # Errors
///
/// Returns an error if the bonus value is negative.
pub fn validate_bonus(bonus: &ActiveBonus) -> Result<(), DomainError> {
    require_non_negative("value", bonus.value)
}
