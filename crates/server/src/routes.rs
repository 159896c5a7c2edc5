// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP surface over the shift ledger service.

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftbook_api::{
    AmendShiftRequest, ApiError, BonusResponse, CloseShiftRequest, CreateEmployeeRequest,
    CreateShiftRequest, CreditBonusBalanceRequest, EmployeeResponse, FailedEventsResponse,
    GrantBonusRequest, ListBonusTransactionsResponse, ListBonusesResponse, ListShiftsResponse,
    OpenShiftRequest, RankResponse, ResolveTierResponse, SettlementResponse, ShiftResponse,
    ShiftService,
};
use tracing::{error, info, warn};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger service.
    pub service: ShiftService,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::TransientIo { .. } => {
                warn!(error = %err, "Storage unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    /// Maximum rows to return.
    pub limit: Option<i64>,
}

/// Query parameters for GET `/tiers/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveTierQuery {
    /// Trailing-month sales total.
    pub sales: Decimal,
}

/// Acknowledgement for requests without a payload to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Optional message.
    pub message: Option<String>,
}

/// Handler for POST `/employees`.
async fn handle_create_employee(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), HttpError> {
    info!(name = %req.name, "Handling create_employee request");
    let response: EmployeeResponse = app_state.service.create_employee(&req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/employees/{id}`.
async fn handle_get_employee(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<EmployeeResponse>, HttpError> {
    Ok(Json(app_state.service.get_employee(employee_id).await?))
}

/// Handler for POST `/employees/{id}/balance`.
async fn handle_credit_bonus_balance(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Json(req): Json<CreditBonusBalanceRequest>,
) -> Result<Json<EmployeeResponse>, HttpError> {
    Ok(Json(
        app_state
            .service
            .credit_bonus_balance(employee_id, &req)
            .await?,
    ))
}

/// Handler for GET `/employees/{id}/transactions`.
async fn handle_list_bonus_transactions(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ListBonusTransactionsResponse>, HttpError> {
    Ok(Json(
        app_state
            .service
            .list_bonus_transactions(employee_id, query.limit)
            .await?,
    ))
}

/// Handler for GET `/employees/{id}/ranks/{year}/{month}`.
async fn handle_get_employee_rank(
    AxumState(app_state): AxumState<AppState>,
    Path((employee_id, year, month)): Path<(i64, i32, u8)>,
) -> Result<Json<RankResponse>, HttpError> {
    Ok(Json(
        app_state
            .service
            .get_employee_rank(employee_id, year, month)
            .await?,
    ))
}

/// Handler for GET `/employees/{id}/shifts`.
async fn handle_list_shifts(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ListShiftsResponse>, HttpError> {
    Ok(Json(
        app_state
            .service
            .list_shifts_for_employee(employee_id, query.limit)
            .await?,
    ))
}

/// Handler for POST `/employees/{id}/bonuses`.
async fn handle_grant_bonus(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Json(req): Json<GrantBonusRequest>,
) -> Result<(StatusCode, Json<BonusResponse>), HttpError> {
    info!(employee_id, kind = %req.kind, "Handling grant_bonus request");
    let response: BonusResponse = app_state.service.grant_bonus(employee_id, &req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/employees/{id}/bonuses`.
async fn handle_list_bonuses(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<ListBonusesResponse>, HttpError> {
    Ok(Json(
        app_state.service.get_active_bonuses(employee_id).await?,
    ))
}

/// Handler for POST `/shifts`.
///
/// Records a complete shift.
async fn handle_create_shift(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ShiftResponse>), HttpError> {
    info!(
        employee_id = req.employee_id,
        shift_date = %req.shift_date,
        "Handling create_shift request"
    );
    let response: ShiftResponse = app_state.service.create_shift(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/shifts/open`.
async fn handle_open_shift(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<OpenShiftRequest>,
) -> Result<(StatusCode, Json<ShiftResponse>), HttpError> {
    info!(employee_id = req.employee_id, "Handling open_shift request");
    let response: ShiftResponse = app_state.service.open_shift(&req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/shifts/{id}/close`.
async fn handle_close_shift(
    AxumState(app_state): AxumState<AppState>,
    Path(shift_id): Path<i64>,
    Json(req): Json<CloseShiftRequest>,
) -> Result<Json<ShiftResponse>, HttpError> {
    info!(shift_id, "Handling close_shift request");
    Ok(Json(app_state.service.close_shift(shift_id, req).await?))
}

/// Handler for PATCH `/shifts/{id}`.
async fn handle_amend_shift(
    AxumState(app_state): AxumState<AppState>,
    Path(shift_id): Path<i64>,
    Json(req): Json<AmendShiftRequest>,
) -> Result<Json<ShiftResponse>, HttpError> {
    info!(shift_id, "Handling amend_shift request");
    Ok(Json(app_state.service.amend_shift(shift_id, req).await?))
}

/// Handler for GET `/shifts/{id}`.
async fn handle_get_shift(
    AxumState(app_state): AxumState<AppState>,
    Path(shift_id): Path<i64>,
) -> Result<Json<ShiftResponse>, HttpError> {
    Ok(Json(app_state.service.get_shift(shift_id).await?))
}

/// Handler for GET `/settlements/{employee}/{year}/{month}/{half}`.
async fn handle_get_settlement(
    AxumState(app_state): AxumState<AppState>,
    Path((employee_id, year, month, half)): Path<(i64, i32, u8, u8)>,
) -> Result<Json<SettlementResponse>, HttpError> {
    Ok(Json(
        app_state
            .service
            .get_settlement(employee_id, year, month, half)
            .await?,
    ))
}

/// Handler for POST `/settlements/{employee}/{year}/{month}/{half}/paid`.
async fn handle_mark_settlement_paid(
    AxumState(app_state): AxumState<AppState>,
    Path((employee_id, year, month, half)): Path<(i64, i32, u8, u8)>,
) -> Result<Json<SettlementResponse>, HttpError> {
    info!(employee_id, year, month, half, "Handling mark_settlement_paid request");
    Ok(Json(
        app_state
            .service
            .mark_settlement_paid(employee_id, year, month, half)
            .await?,
    ))
}

/// Handler for GET `/tiers/resolve?sales=`.
async fn handle_resolve_tier(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ResolveTierQuery>,
) -> Result<Json<ResolveTierResponse>, HttpError> {
    Ok(Json(app_state.service.resolve_tier(query.sales).await?))
}

/// Handler for GET `/outbox/failed`.
async fn handle_list_failed_events(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<FailedEventsResponse>, HttpError> {
    Ok(Json(
        app_state.service.list_failed_events(query.limit).await?,
    ))
}

/// Handler for POST `/outbox/failed/{id}/retry`.
async fn handle_retry_failed_event(
    AxumState(app_state): AxumState<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<WriteResponse>, HttpError> {
    app_state.service.retry_failed_event(event_id).await?;
    Ok(Json(WriteResponse {
        success: true,
        message: Some(format!("Requeued event {event_id}")),
    }))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/employees", post(handle_create_employee))
        .route("/employees/{id}", get(handle_get_employee))
        .route("/employees/{id}/balance", post(handle_credit_bonus_balance))
        .route("/employees/{id}/shifts", get(handle_list_shifts))
        .route(
            "/employees/{id}/transactions",
            get(handle_list_bonus_transactions),
        )
        .route(
            "/employees/{id}/ranks/{year}/{month}",
            get(handle_get_employee_rank),
        )
        .route(
            "/employees/{id}/bonuses",
            get(handle_list_bonuses).post(handle_grant_bonus),
        )
        .route("/shifts", post(handle_create_shift))
        .route("/shifts/open", post(handle_open_shift))
        .route("/shifts/{id}", get(handle_get_shift).patch(handle_amend_shift))
        .route("/shifts/{id}/close", post(handle_close_shift))
        .route(
            "/settlements/{employee}/{year}/{month}/{half}",
            get(handle_get_settlement),
        )
        .route(
            "/settlements/{employee}/{year}/{month}/{half}/paid",
            post(handle_mark_settlement_paid),
        )
        .route("/tiers/resolve", get(handle_resolve_tier))
        .route("/outbox/failed", get(handle_list_failed_events))
        .route("/outbox/failed/{id}/retry", post(handle_retry_failed_event))
        .with_state(app_state)
}
