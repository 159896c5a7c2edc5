// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_employee, create_test_persistence, create_test_shift, date, dec};
use crate::{Persistence, PersistenceError};
use shiftbook_domain::{FortnightPeriod, FortnightSettlement};
use shiftbook_outbox::{EntitySnapshot, EntityTable, OutboxEvent, OutboxOperation};

fn first_half_of_march() -> FortnightPeriod {
    FortnightPeriod::new(2026, 3, 1).unwrap()
}

fn settlement_events(persistence: &mut Persistence, settlement_id: i64) -> Vec<OutboxEvent> {
    persistence
        .list_events_for_entity(EntityTable::EmployeeFortnights, &settlement_id.to_string())
        .unwrap()
}

#[test]
fn test_settlement_sums_period_shifts() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 3), "300");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 9), "525");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 10), "500");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 20), "999");

    let settlement: FortnightSettlement = persistence
        .get_settlement(employee_id, first_half_of_march())
        .unwrap()
        .unwrap();

    assert_eq!(settlement.total_shifts, 3);
    assert_eq!(settlement.total_worked_hours, dec("24"));
    assert_eq!(settlement.total_sales, dec("1325"));
    assert_eq!(settlement.total_commissions, dec("63.6"));
    assert_eq!(settlement.total_hourly_pay, dec("480"));
    assert_eq!(settlement.total_made, dec("543.6"));
    assert_eq!(settlement.bonus_counter_true_count, 1);
    assert_eq!(settlement.bonus_amount, dec("0.64"));
    assert_eq!(settlement.total_salary, dec("544.24"));
    assert_eq!(settlement.payment_date, date(2026, 3, 16));
    assert!(!settlement.is_paid);
}

#[test]
fn test_settlement_insert_then_update_events() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 3), "300");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 4), "300");

    let settlement_id: i64 = persistence
        .get_settlement(employee_id, first_half_of_march())
        .unwrap()
        .unwrap()
        .settlement_id
        .unwrap();
    let events: Vec<OutboxEvent> = settlement_events(&mut persistence, settlement_id);
    let operations: Vec<OutboxOperation> = events.iter().map(|e| e.operation).collect();

    assert_eq!(
        operations,
        vec![OutboxOperation::Insert, OutboxOperation::Update]
    );
    let EntitySnapshot::Settlement(snapshot) = &events[1].payload else {
        panic!("Expected a settlement snapshot");
    };
    assert_eq!(snapshot.total_shifts, 2);
    assert_eq!(snapshot.half, 1);
}

#[test]
fn test_recompute_unchanged_settlement_still_enqueues_update() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 3), "300");

    let before: FortnightSettlement = persistence
        .get_settlement(employee_id, first_half_of_march())
        .unwrap()
        .unwrap();
    let recomputed: Option<FortnightSettlement> = persistence
        .recompute_settlement(employee_id, first_half_of_march())
        .unwrap();

    assert_eq!(recomputed.as_ref(), Some(&before));
    let operations: Vec<OutboxOperation> =
        settlement_events(&mut persistence, before.settlement_id.unwrap())
            .iter()
            .map(|e| e.operation)
            .collect();
    assert_eq!(
        operations,
        vec![OutboxOperation::Insert, OutboxOperation::Update]
    );
    let after: FortnightSettlement = persistence
        .get_settlement(employee_id, first_half_of_march())
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_recompute_empty_period_returns_none() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");

    let result = persistence
        .recompute_settlement(employee_id, first_half_of_march())
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_mark_settlement_paid_is_idempotent() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");
    create_test_shift(&mut persistence, employee_id, date(2026, 3, 3), "300");

    let paid: FortnightSettlement = persistence
        .mark_settlement_paid(employee_id, first_half_of_march())
        .unwrap();
    assert!(paid.is_paid);

    let again: FortnightSettlement = persistence
        .mark_settlement_paid(employee_id, first_half_of_march())
        .unwrap();
    assert_eq!(again, paid);

    let events: Vec<OutboxEvent> = settlement_events(&mut persistence, paid.settlement_id.unwrap());
    assert_eq!(events.len(), 2);

    let stored: FortnightSettlement = persistence
        .recompute_settlement(employee_id, first_half_of_march())
        .unwrap()
        .unwrap();
    assert!(stored.is_paid);
}

#[test]
fn test_mark_missing_settlement_paid_fails() {
    let mut persistence: Persistence = create_test_persistence();
    let employee_id: i64 = create_test_employee(&mut persistence, "Alice");

    let result = persistence.mark_settlement_paid(employee_id, first_half_of_march());
    assert!(matches!(
        result,
        Err(PersistenceError::SettlementNotFound { .. })
    ));
}
