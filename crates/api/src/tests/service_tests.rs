// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{
    create_test_employee, create_test_service, create_test_shift, create_test_shift_request, dec,
};
use crate::{
    AmendShiftRequest, ApiError, CloseShiftRequest, CreateEmployeeRequest,
    CreditBonusBalanceRequest, GrantBonusRequest, OpenShiftRequest, ProductSaleInfo,
    ShiftResponse,
};
use shiftbook_outbox::OutboxStatus;

#[tokio::test]
async fn test_create_shift_returns_figures() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let first: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-03", "300").await;
    create_test_shift(&service, employee_id, "2026-03-09", "525").await;
    let shift: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-10", "500").await;

    assert_eq!(first.rolling_average, None);
    assert!(!first.bonus_counter);

    assert_eq!(shift.shift_date, "2026-03-10");
    assert_eq!(shift.clock_in, "2026-03-10 09:00:00");
    assert_eq!(shift.clock_out.as_deref(), Some("2026-03-10 17:00:00"));
    assert_eq!(shift.status, "closed");
    assert_eq!(shift.net_sales, dec("400"));
    assert_eq!(shift.commission_amount, dec("24"));
    assert_eq!(shift.total_hourly, dec("160"));
    assert_eq!(shift.total_made, dec("184"));
    assert_eq!(shift.rolling_average, Some(dec("450")));
    assert!(shift.bonus_counter);

    let fetched: ShiftResponse = service.get_shift(shift.shift_id).await.unwrap();
    assert_eq!(fetched, shift);
}

#[tokio::test]
async fn test_create_employee_rejects_empty_name() {
    let (service, _) = create_test_service();
    let result = service
        .create_employee(&CreateEmployeeRequest {
            name: String::from("  "),
            hourly_wage: dec("20"),
        })
        .await;
    assert!(matches!(result, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_get_unknown_employee_is_not_found() {
    let (service, _) = create_test_service();
    let result = service.get_employee(99).await;
    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn test_malformed_time_is_validation_error() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let mut request = create_test_shift_request(employee_id, "2026-03-10", "500");
    request.clock_out = String::from("5pm");

    let result = service.create_shift(request).await;
    assert!(matches!(result, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_clock_out_before_clock_in_writes_nothing() {
    let (service, shared) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let pending_before: i64 = shared
        .lock()
        .await
        .count_events(OutboxStatus::Pending)
        .unwrap();

    let mut request = create_test_shift_request(employee_id, "2026-03-10", "500");
    request.clock_out = String::from("2026-03-10 08:00:00");
    let result = service.create_shift(request).await;

    match result {
        Err(ApiError::Validation { field, .. }) => assert_eq!(field, "clock_out"),
        other => panic!("Expected validation error, got {other:?}"),
    }
    let listed = service
        .list_shifts_for_employee(employee_id, None)
        .await
        .unwrap();
    assert!(listed.shifts.is_empty());
    assert_eq!(
        shared
            .lock()
            .await
            .count_events(OutboxStatus::Pending)
            .unwrap(),
        pending_before
    );
}

#[tokio::test]
async fn test_open_and_close_shift() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let open: ShiftResponse = service
        .open_shift(&OpenShiftRequest {
            employee_id,
            shift_date: None,
            clock_in: Some(String::from("2026-03-10 09:00:00")),
        })
        .await
        .unwrap();
    assert_eq!(open.status, "open");
    assert_eq!(open.shift_date, "2026-03-10");
    assert_eq!(open.clock_out, None);

    let closed: ShiftResponse = service
        .close_shift(
            open.shift_id,
            CloseShiftRequest {
                clock_out: Some(String::from("2026-03-10 17:00:00")),
                product_sales: vec![ProductSaleInfo {
                    product: String::from("Widget"),
                    amount: dec("500"),
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.status, "closed");
    assert_eq!(closed.total_made, dec("184"));

    let again = service
        .close_shift(
            open.shift_id,
            CloseShiftRequest {
                clock_out: Some(String::from("2026-03-10 18:00:00")),
                product_sales: Vec::new(),
            },
        )
        .await;
    assert!(matches!(again, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_open_shift_defaults_to_now() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let open: ShiftResponse = service
        .open_shift(&OpenShiftRequest {
            employee_id,
            shift_date: None,
            clock_in: None,
        })
        .await
        .unwrap();
    assert_eq!(open.status, "open");
    assert!(open.clock_in.starts_with(&open.shift_date));
}

#[tokio::test]
async fn test_amend_shift_updates_settlement() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let shift: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-10", "500").await;

    let amended: ShiftResponse = service
        .amend_shift(
            shift.shift_id,
            AmendShiftRequest {
                product_sales: Some(vec![ProductSaleInfo {
                    product: String::from("Widget"),
                    amount: dec("1000"),
                }]),
                ..AmendShiftRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(amended.total_made, dec("208"));

    let settlement = service
        .get_settlement(employee_id, 2026, 3, 1)
        .await
        .unwrap();
    assert_eq!(settlement.total_sales, dec("1000"));
    assert_eq!(settlement.total_shifts, 1);
    assert_eq!(settlement.payment_date, "2026-03-16");
}

#[tokio::test]
async fn test_empty_amendment_is_refused() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let shift: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-10", "500").await;

    let result = service
        .amend_shift(shift.shift_id, AmendShiftRequest::default())
        .await;
    assert!(matches!(result, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_paid_settlement_blocks_amendment() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let shift: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-10", "500").await;

    let paid = service
        .mark_settlement_paid(employee_id, 2026, 3, 1)
        .await
        .unwrap();
    assert!(paid.is_paid);

    let result = service
        .amend_shift(
            shift.shift_id,
            AmendShiftRequest {
                clock_out: Some(String::from("2026-03-10 18:00:00")),
                ..AmendShiftRequest::default()
            },
        )
        .await;
    match result {
        Err(ApiError::Validation { field, .. }) => assert_eq!(field, "period_paid"),
        other => panic!("Expected paid-period refusal, got {other:?}"),
    }
}

#[tokio::test]
async fn test_settlement_lookup_errors() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let missing = service.get_settlement(employee_id, 2026, 3, 1).await;
    assert!(matches!(missing, Err(ApiError::NotFound { .. })));

    let bad_half = service.get_settlement(employee_id, 2026, 3, 3).await;
    assert!(matches!(bad_half, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_list_shifts_newest_first() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    create_test_shift(&service, employee_id, "2026-03-03", "300").await;
    create_test_shift(&service, employee_id, "2026-03-09", "525").await;
    create_test_shift(&service, employee_id, "2026-03-10", "500").await;

    let listed = service
        .list_shifts_for_employee(employee_id, Some(2))
        .await
        .unwrap();
    let dates: Vec<&str> = listed.shifts.iter().map(|s| s.shift_date.as_str()).collect();
    assert_eq!(dates, vec!["2026-03-10", "2026-03-09"]);

    let zero = service.list_shifts_for_employee(employee_id, Some(0)).await;
    assert!(matches!(zero, Err(ApiError::Validation { .. })));
    let unknown = service.list_shifts_for_employee(99, None).await;
    assert!(matches!(unknown, Err(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn test_granted_bonus_is_consumed_by_next_shift() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let bonus = service
        .grant_bonus(
            employee_id,
            &GrantBonusRequest {
                kind: String::from("flat"),
                value: dec("10"),
            },
        )
        .await
        .unwrap();
    assert_eq!(bonus.kind, "flat");
    assert!(!bonus.applied);
    assert_eq!(
        service
            .get_active_bonuses(employee_id)
            .await
            .unwrap()
            .bonuses
            .len(),
        1
    );

    let shift: ShiftResponse = create_test_shift(&service, employee_id, "2026-03-10", "500").await;
    assert_eq!(shift.flat_bonus, dec("10"));
    assert_eq!(shift.total_made, dec("194"));
    assert!(
        service
            .get_active_bonuses(employee_id)
            .await
            .unwrap()
            .bonuses
            .is_empty()
    );
}

#[tokio::test]
async fn test_unknown_bonus_kind_is_refused() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;
    let result = service
        .grant_bonus(
            employee_id,
            &GrantBonusRequest {
                kind: String::from("triple"),
                value: dec("1"),
            },
        )
        .await;
    match result {
        Err(ApiError::Validation { field, .. }) => assert_eq!(field, "kind"),
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_credit_bonus_balance() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let credited = service
        .credit_bonus_balance(
            employee_id,
            &CreditBonusBalanceRequest {
                amount: dec("15"),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(credited.bonus_balance, dec("15"));

    let overdrawn = service
        .credit_bonus_balance(
            employee_id,
            &CreditBonusBalanceRequest {
                amount: dec("-20"),
                description: None,
            },
        )
        .await;
    assert!(matches!(overdrawn, Err(ApiError::Validation { .. })));
    assert_eq!(
        service.get_employee(employee_id).await.unwrap().bonus_balance,
        dec("15")
    );
}

#[tokio::test]
async fn test_resolve_tier() {
    let (service, _) = create_test_service();

    let low = service.resolve_tier(dec("1200")).await.unwrap();
    assert_eq!(low.name, "Tier C");
    assert_eq!(low.percentage, dec("6"));
    assert!(!low.fallback);

    let boundary = service.resolve_tier(dec("50000")).await.unwrap();
    assert_eq!(boundary.name, "Tier B");

    let top = service.resolve_tier(dec("250000")).await.unwrap();
    assert_eq!(top.name, "Tier A");

    let negative = service.resolve_tier(dec("-1")).await;
    assert!(matches!(negative, Err(ApiError::Validation { .. })));
}

#[tokio::test]
async fn test_failed_events_can_be_retried() {
    let (service, shared) = create_test_service();
    create_test_employee(&service, "Alice").await;

    let event_id: i64 = {
        let mut persistence = shared.lock().await;
        let claimed = persistence.claim_outbox_batch(i64::MAX, 1).unwrap();
        let event_id: i64 = claimed[0].event_id.unwrap();
        persistence
            .mark_event_failed(event_id, 5, 0, 1, "mirror rejected row")
            .unwrap();
        event_id
    };

    assert_eq!(service.failed_event_count().await.unwrap(), 1);
    let failed = service.list_failed_events(None).await.unwrap();
    assert_eq!(failed.failed_count, 1);
    assert_eq!(failed.events[0].sheet, "Employees");
    assert_eq!(
        failed.events[0].last_error.as_deref(),
        Some("mirror rejected row")
    );

    service.retry_failed_event(event_id).await.unwrap();
    assert_eq!(service.failed_event_count().await.unwrap(), 0);

    let again = service.retry_failed_event(event_id).await;
    assert!(matches!(again, Err(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn test_rank_and_reward_follow_closed_shifts() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    create_test_shift(&service, employee_id, "2026-03-10", "6000").await;

    let rank = service.get_employee_rank(employee_id, 2026, 3).await.unwrap();
    assert_eq!(rank.current_rank, "Hustler");
    assert_eq!(rank.best_rank, "Hustler");
    assert_eq!(rank.total_sales, dec("6000"));

    let history = service
        .list_bonus_transactions(employee_id, None)
        .await
        .unwrap();
    assert_eq!(history.transactions.len(), 1);
    assert_eq!(history.transactions[0].kind, "rank_reward");
    assert_eq!(history.transactions[0].amount, dec("50"));
    assert_eq!(
        service.get_employee(employee_id).await.unwrap().bonus_balance,
        dec("50")
    );
}

#[tokio::test]
async fn test_unranked_month_is_not_found() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    let missing = service.get_employee_rank(employee_id, 2026, 3).await;
    assert!(matches!(missing, Err(ApiError::NotFound { .. })));

    let invalid = service.get_employee_rank(employee_id, 2026, 13).await;
    match invalid {
        Err(ApiError::Validation { field, .. }) => assert_eq!(field, "month"),
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_credit_description_is_kept_on_transaction() {
    let (service, _) = create_test_service();
    let employee_id: i64 = create_test_employee(&service, "Alice").await;

    service
        .credit_bonus_balance(
            employee_id,
            &CreditBonusBalanceRequest {
                amount: dec("10"),
                description: Some(String::from("Referral")),
            },
        )
        .await
        .unwrap();

    let history = service
        .list_bonus_transactions(employee_id, Some(5))
        .await
        .unwrap();
    assert_eq!(history.transactions[0].description, "Referral");
    assert_eq!(history.transactions[0].kind, "credit");
    assert!(matches!(
        service.list_bonus_transactions(employee_id, Some(0)).await,
        Err(ApiError::Validation { .. })
    ));
    assert!(matches!(
        service.list_bonus_transactions(404, None).await,
        Err(ApiError::NotFound { .. })
    ));
}
