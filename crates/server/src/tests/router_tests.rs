// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use axum::Router;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use shiftbook_api::{
    EmployeeResponse, FailedEventsResponse, ListBonusTransactionsResponse, ListBonusesResponse,
    ListShiftsResponse, RankResponse, ResolveTierResponse, SettlementResponse, ShiftResponse,
};

use super::{create_test_app, read_json, send_get, send_json};
use crate::routes::ErrorResponse;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

async fn create_test_employee(app: &Router) -> i64 {
    let response = send_json(
        app,
        "POST",
        "/employees",
        &json!({ "name": "Alice", "hourly_wage": "20" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let employee: EmployeeResponse = read_json(response).await;
    employee.employee_id
}

async fn post_shift(app: &Router, employee_id: i64, day: &str, sales: &str) -> ShiftResponse {
    let response = send_json(
        app,
        "POST",
        "/shifts",
        &json!({
            "employee_id": employee_id,
            "shift_date": day,
            "clock_in": format!("{day} 09:00:00"),
            "clock_out": format!("{day} 17:00:00"),
            "product_sales": [{ "product": "Widget", "amount": sales }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn test_create_and_get_employee() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;

    let response = send_get(&app, &format!("/employees/{employee_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let employee: EmployeeResponse = read_json(response).await;
    assert_eq!(employee.name, "Alice");
    assert_eq!(employee.hourly_wage, dec("20"));
    assert!(employee.is_active);
}

#[tokio::test]
async fn test_unknown_employee_returns_not_found() {
    let (app, _) = create_test_app();
    let response = send_get(&app, "/employees/404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error_response: ErrorResponse = read_json(response).await;
    assert!(error_response.error);
    assert!(error_response.message.contains("Employee not found"));
}

#[tokio::test]
async fn test_shift_figures_over_http() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;

    post_shift(&app, employee_id, "2026-03-03", "300").await;
    post_shift(&app, employee_id, "2026-03-09", "525").await;
    let shift: ShiftResponse = post_shift(&app, employee_id, "2026-03-10", "500").await;

    assert_eq!(shift.total_made, dec("184"));
    assert_eq!(shift.rolling_average, Some(dec("450")));
    assert!(shift.bonus_counter);

    let response = send_get(&app, &format!("/shifts/{}", shift.shift_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: ShiftResponse = read_json(response).await;
    assert_eq!(fetched, shift);

    let response = send_get(&app, &format!("/employees/{employee_id}/shifts?limit=1")).await;
    let listed: ListShiftsResponse = read_json(response).await;
    assert_eq!(listed.shifts.len(), 1);
    assert_eq!(listed.shifts[0].shift_id, shift.shift_id);
}

#[tokio::test]
async fn test_invalid_shift_returns_bad_request() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/shifts",
        &json!({
            "employee_id": employee_id,
            "shift_date": "2026-03-10",
            "clock_in": "2026-03-10 17:00:00",
            "clock_out": "2026-03-10 09:00:00",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_get(&app, &format!("/employees/{employee_id}/shifts")).await;
    let listed: ListShiftsResponse = read_json(response).await;
    assert!(listed.shifts.is_empty());
}

#[tokio::test]
async fn test_open_close_and_amend_over_http() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;

    let response = send_json(
        &app,
        "POST",
        "/shifts/open",
        &json!({ "employee_id": employee_id, "clock_in": "2026-03-10 09:00:00" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let open: ShiftResponse = read_json(response).await;
    assert_eq!(open.status, "open");

    let response = send_json(
        &app,
        "POST",
        &format!("/shifts/{}/close", open.shift_id),
        &json!({
            "clock_out": "2026-03-10 17:00:00",
            "product_sales": [{ "product": "Widget", "amount": "500" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let closed: ShiftResponse = read_json(response).await;
    assert_eq!(closed.total_made, dec("184"));

    let response = send_json(
        &app,
        "PATCH",
        &format!("/shifts/{}", open.shift_id),
        &json!({ "product_sales": [{ "product": "Widget", "amount": "1000" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let amended: ShiftResponse = read_json(response).await;
    assert_eq!(amended.total_made, dec("208"));
    assert_eq!(amended.status, "closed");
}

#[tokio::test]
async fn test_settlement_lifecycle_over_http() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;
    let uri: String = format!("/settlements/{employee_id}/2026/3/1");

    let response = send_get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let shift: ShiftResponse = post_shift(&app, employee_id, "2026-03-10", "500").await;

    let response = send_get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let settlement: SettlementResponse = read_json(response).await;
    assert_eq!(settlement.total_shifts, 1);
    assert_eq!(settlement.total_salary, dec("184"));
    assert_eq!(settlement.payment_date, "2026-03-16");
    assert!(!settlement.is_paid);

    let response = send_json(&app, "POST", &format!("{uri}/paid"), &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let paid: SettlementResponse = read_json(response).await;
    assert!(paid.is_paid);

    let response = send_json(
        &app,
        "PATCH",
        &format!("/shifts/{}", shift.shift_id),
        &json!({ "clock_out": "2026-03-10 18:00:00" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bonuses_over_http() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;
    let uri: String = format!("/employees/{employee_id}/bonuses");

    let response = send_json(
        &app,
        "POST",
        &uri,
        &json!({ "kind": "percent_next", "value": "1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_get(&app, &uri).await;
    let listed: ListBonusesResponse = read_json(response).await;
    assert_eq!(listed.bonuses.len(), 1);
    assert_eq!(listed.bonuses[0].kind, "percent_next");

    let shift: ShiftResponse = post_shift(&app, employee_id, "2026-03-10", "500").await;
    assert_eq!(shift.commission_pct, dec("7"));

    let response = send_get(&app, &uri).await;
    let listed: ListBonusesResponse = read_json(response).await;
    assert!(listed.bonuses.is_empty());
}

#[tokio::test]
async fn test_resolve_tier_over_http() {
    let (app, _) = create_test_app();

    let response = send_get(&app, "/tiers/resolve?sales=60000").await;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved: ResolveTierResponse = read_json(response).await;
    assert_eq!(resolved.name, "Tier B");
    assert_eq!(resolved.percentage, dec("5"));
    assert!(!resolved.fallback);

    let response = send_get(&app, "/tiers/resolve?sales=-5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_events_over_http() {
    let (app, shared) = create_test_app();
    create_test_employee(&app).await;

    let response = send_get(&app, "/outbox/failed").await;
    let failed: FailedEventsResponse = read_json(response).await;
    assert_eq!(failed.failed_count, 0);

    let event_id: i64 = {
        let mut persistence = shared.lock().await;
        let claimed = persistence.claim_outbox_batch(i64::MAX, 1).unwrap();
        let event_id: i64 = claimed[0].event_id.unwrap();
        persistence
            .mark_event_failed(event_id, 5, 0, 1, "mirror rejected row")
            .unwrap();
        event_id
    };

    let response = send_get(&app, "/outbox/failed").await;
    let failed: FailedEventsResponse = read_json(response).await;
    assert_eq!(failed.failed_count, 1);
    assert_eq!(failed.events[0].event_id, Some(event_id));

    let response = send_json(
        &app,
        "POST",
        &format!("/outbox/failed/{event_id}/retry"),
        &json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_get(&app, "/outbox/failed").await;
    let failed: FailedEventsResponse = read_json(response).await;
    assert_eq!(failed.failed_count, 0);
}

#[tokio::test]
async fn test_rank_and_transactions_over_http() {
    let (app, _) = create_test_app();
    let employee_id: i64 = create_test_employee(&app).await;
    post_shift(&app, employee_id, "2026-03-10", "12000").await;

    let response = send_get(&app, &format!("/employees/{employee_id}/ranks/2026/3")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rank: RankResponse = read_json(response).await;
    assert_eq!(rank.current_rank, "Closer");

    let response = send_get(&app, &format!("/employees/{employee_id}/ranks/2026/4")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_json(
        &app,
        "POST",
        &format!("/employees/{employee_id}/balance"),
        &json!({ "amount": "-40", "description": "Gift card" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_get(
        &app,
        &format!("/employees/{employee_id}/transactions?limit=10"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let history: ListBonusTransactionsResponse = read_json(response).await;
    let kinds: Vec<&str> = history
        .transactions
        .iter()
        .map(|t| t.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["debit", "rank_reward"]);
    assert_eq!(history.transactions[0].balance_after, dec("60"));
}
