// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{at, create_history_averaging_450, create_test_state, date, dec};
use crate::{Command, CoreError, LedgerState, TransitionResult, apply};
use shiftbook_domain::{
    ActiveBonus, BonusKind, DomainError, FortnightPeriod, ProductSale, ShiftStatus,
};
use shiftbook_outbox::OutboxOperation;
use time::Date;

fn create_shift_command(day: Date, sales: &str) -> Command {
    Command::CreateShift {
        shift_date: day,
        clock_in: at(day, 9, 0),
        clock_out: at(day, 17, 0),
        product_sales: vec![ProductSale::new("Widget", dec(sales))],
    }
}

#[test]
fn test_create_shift_end_to_end_with_history() {
    let mut state: LedgerState = create_test_state();
    state.history = create_history_averaging_450();

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "500")).unwrap();
    let figures = &result.shift.figures;

    assert_eq!(figures.net_sales, dec("400"));
    assert_eq!(figures.commission_pct, dec("6"));
    assert_eq!(figures.commission_amount, dec("24"));
    assert_eq!(figures.total_hourly, dec("160"));
    assert_eq!(figures.total_made, dec("184"));
    assert_eq!(figures.rolling_average, Some(dec("450")));
    assert!(figures.bonus_counter);

    assert_eq!(result.shift.status, ShiftStatus::Closed);
    assert_eq!(result.operation, OutboxOperation::Insert);
    assert_eq!(result.resolved_tier.unwrap().name, "Tier C");
    assert_eq!(
        result.affected_periods,
        vec![FortnightPeriod::new(2026, 3, 1).unwrap()]
    );
}

#[test]
fn test_create_shift_end_to_end_without_history() {
    let state: LedgerState = create_test_state();

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "100000")).unwrap();

    assert_eq!(result.shift.figures.rolling_average, None);
    assert!(!result.shift.figures.bonus_counter);
}

#[test]
fn test_sales_equal_to_average_sets_bonus_counter() {
    let mut state: LedgerState = create_test_state();
    state.history = create_history_averaging_450();

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "450")).unwrap();
    assert!(result.shift.figures.bonus_counter);

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "449.99")).unwrap();
    assert!(!result.shift.figures.bonus_counter);
}

#[test]
fn test_trailing_month_sales_select_tier() {
    let mut state: LedgerState = create_test_state();
    state.trailing_month_sales = dec("60000");

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "500")).unwrap();

    assert_eq!(result.shift.figures.commission_pct, dec("5"));
    assert_eq!(result.shift.figures.commission_amount, dec("20"));
    assert_eq!(result.resolved_tier.unwrap().tier_id, Some(2));
}

#[test]
fn test_commission_override_replaces_tier_percentage() {
    let mut state: LedgerState = create_test_state();
    state.employee.commission_override_pct = Some(dec("10"));

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "500")).unwrap();

    assert_eq!(result.shift.figures.commission_pct, dec("10"));
    assert_eq!(result.shift.figures.commission_amount, dec("40"));
}

#[test]
fn test_active_bonuses_are_applied_and_consumed() {
    let mut state: LedgerState = create_test_state();
    let mut percent: ActiveBonus = ActiveBonus::new(1, BonusKind::PercentNext, dec("1"));
    percent.bonus_id = Some(21);
    let mut flat: ActiveBonus = ActiveBonus::new(1, BonusKind::Flat, dec("10"));
    flat.bonus_id = Some(22);
    state.active_bonuses = vec![percent, flat];

    let result: TransitionResult =
        apply(&state, create_shift_command(date(2026, 3, 10), "500")).unwrap();

    assert_eq!(result.shift.figures.commission_pct, dec("7"));
    assert_eq!(result.shift.figures.commission_amount, dec("28"));
    assert_eq!(result.shift.figures.flat_bonus, dec("10"));
    assert_eq!(result.shift.figures.total_made, dec("198"));
    assert_eq!(result.consumed_bonus_ids, vec![21, 22]);
}

#[test]
fn test_create_shift_rejects_inverted_range() {
    let state: LedgerState = create_test_state();
    let day: Date = date(2026, 3, 10);

    let result = apply(
        &state,
        Command::CreateShift {
            shift_date: day,
            clock_in: at(day, 17, 0),
            clock_out: at(day, 9, 0),
            product_sales: Vec::new(),
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidTimeRange { .. }
        ))
    ));
}

#[test]
fn test_create_shift_rejects_negative_sales() {
    let state: LedgerState = create_test_state();
    let result = apply(&state, create_shift_command(date(2026, 3, 10), "-1"));
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::NegativeAmount { .. }))
    ));
}

#[test]
fn test_create_shift_rejects_inactive_employee() {
    let mut state: LedgerState = create_test_state();
    state.employee.is_active = false;

    let result = apply(&state, create_shift_command(date(2026, 3, 10), "1"));
    assert_eq!(result, Err(CoreError::InactiveEmployee { employee_id: 1 }));
}

#[test]
fn test_create_shift_rejects_paid_period() {
    let mut state: LedgerState = create_test_state();
    let period: FortnightPeriod = FortnightPeriod::new(2026, 3, 1).unwrap();
    state.paid_periods = vec![period];

    let result = apply(&state, create_shift_command(date(2026, 3, 10), "1"));
    assert_eq!(result, Err(CoreError::PeriodPaid { period }));
}

#[test]
fn test_create_shift_requires_persisted_employee() {
    let mut state: LedgerState = create_test_state();
    state.employee.employee_id = None;

    let result = apply(&state, create_shift_command(date(2026, 3, 10), "1"));
    assert_eq!(result, Err(CoreError::UnpersistedEmployee));
}
