// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod cli_tests;
mod router_tests;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shiftbook_api::{PayrollConfig, ShiftService};
use shiftbook_persistence::Persistence;
use shiftbook_replication::SharedPersistence;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::routes::{AppState, build_router};

/// Helper to create a router over in-memory persistence.
pub fn create_test_app() -> (Router, SharedPersistence) {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let shared: SharedPersistence = Arc::new(Mutex::new(persistence));
    let service: ShiftService = ShiftService::new(Arc::clone(&shared), &PayrollConfig::default())
        .expect("Failed to create service");
    (build_router(AppState { service }), shared)
}

pub async fn send_json<T: Serialize>(
    app: &Router,
    method: &str,
    uri: &str,
    body: &T,
) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn send_get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
