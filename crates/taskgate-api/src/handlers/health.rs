// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handler.

use axum::{Json, extract::State, response::IntoResponse};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Liveness check. Returns 200 OK if the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(state.revocations().len()))
}
