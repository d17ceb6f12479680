// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.
//!
//! All four endpoints are public. Logout and validation read the bearer
//! header themselves instead of relying on the auth middleware, so a revoked
//! or expired token still reaches them.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::{ApiResult, ValidationErrors};
use crate::extractors::{AuthorizationHeader, ClientIp, ValidatedJson};
use crate::response::{MessageResponse, TokenResponse, ValidityResponse};
use crate::state::AppState;
use crate::validation::{Validate, check_password, check_username};

// =============================================================================
// Request Bodies
// =============================================================================

/// Credentials body shared by login and signup.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Validate for CredentialsRequest {
    fn validate(&self, errors: &mut ValidationErrors) {
        check_username("username", &self.username, errors);
        check_password("password", &self.password, errors);
    }
}

// =============================================================================
// Login
// =============================================================================

/// POST /auth/login
///
/// Exchanges credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let issued = state
        .sessions()
        .login(&request.username, &request.password)
        .await
        .inspect_err(|_| tracing::debug!(client_ip = ?client_ip, "Login failed"))?;

    Ok(Json(TokenResponse::from(issued)))
}

// =============================================================================
// Signup
// =============================================================================

/// POST /auth/signup
///
/// Registers an account and returns an access token for it.
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let issued = state
        .sessions()
        .signup(&request.username, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse::from(issued))))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /auth/logout
///
/// Revokes the presented bearer token.
pub async fn logout(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
) -> ApiResult<impl IntoResponse> {
    state.sessions().logout(authorization.as_deref()).await?;

    Ok(Json(MessageResponse::new("Logout completed successfully")))
}

// =============================================================================
// Validate Token
// =============================================================================

/// POST /auth/validate-token
///
/// Answers 200 `{valid: true}` for a live token and 401 otherwise.
pub async fn validate_token(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions()
        .validate_token(authorization.as_deref())
        .await?;

    Ok(Json(ValidityResponse { valid: true }))
}
