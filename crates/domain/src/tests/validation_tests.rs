// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{at, date, dec};
use crate::{
    ActiveBonus, BonusKind, DomainError, Employee, ProductSale, validate_bonus,
    validate_employee_fields, validate_product_sales, validate_time_range,
};
use time::Date;

fn create_test_employee() -> Employee {
    Employee::new("Test Employee", dec("20"))
}

#[test]
fn test_validate_employee_fields_accepts_valid_employee() {
    assert!(validate_employee_fields(&create_test_employee()).is_ok());
}

#[test]
fn test_validate_employee_fields_rejects_blank_name() {
    let mut employee: Employee = create_test_employee();
    employee.name = String::from("   ");
    assert!(matches!(
        validate_employee_fields(&employee),
        Err(DomainError::InvalidName(_))
    ));
}

#[test]
fn test_validate_employee_fields_rejects_negative_wage() {
    let mut employee: Employee = create_test_employee();
    employee.hourly_wage = dec("-1");
    assert!(matches!(
        validate_employee_fields(&employee),
        Err(DomainError::NegativeAmount { .. })
    ));
}

#[test]
fn test_validate_employee_fields_rejects_negative_override() {
    let mut employee: Employee = create_test_employee();
    employee.commission_override_pct = Some(dec("-2"));
    assert!(validate_employee_fields(&employee).is_err());
}

#[test]
fn test_validate_time_range() {
    let day: Date = date(2026, 3, 10);
    assert!(validate_time_range(at(day, 9, 0), at(day, 9, 1)).is_ok());
    assert!(validate_time_range(at(day, 9, 0), at(day, 9, 0)).is_err());
    assert!(validate_time_range(at(day, 10, 0), at(day, 9, 0)).is_err());
}

#[test]
fn test_validate_product_sales_accepts_zero_amounts() {
    let sales: Vec<ProductSale> = vec![
        ProductSale::new("Widget", dec("0")),
        ProductSale::new("Gadget", dec("12.5")),
    ];
    assert!(validate_product_sales(&sales).is_ok());
}

#[test]
fn test_validate_product_sales_rejects_negative_amount() {
    let sales: Vec<ProductSale> = vec![ProductSale::new("Widget", dec("-0.01"))];
    assert!(matches!(
        validate_product_sales(&sales),
        Err(DomainError::NegativeAmount { .. })
    ));
}

#[test]
fn test_validate_product_sales_rejects_duplicates() {
    let sales: Vec<ProductSale> = vec![
        ProductSale::new("Widget", dec("1")),
        ProductSale::new("Widget", dec("2")),
    ];
    assert_eq!(
        validate_product_sales(&sales),
        Err(DomainError::DuplicateProduct(String::from("Widget")))
    );
}

#[test]
fn test_validate_product_sales_rejects_empty_name() {
    let sales: Vec<ProductSale> = vec![ProductSale::new(" ", dec("1"))];
    assert_eq!(
        validate_product_sales(&sales),
        Err(DomainError::EmptyProductName)
    );
}

#[test]
fn test_validate_bonus_rejects_negative_value() {
    let bonus: ActiveBonus = ActiveBonus::new(1, BonusKind::Flat, dec("-5"));
    assert!(validate_bonus(&bonus).is_err());
}
