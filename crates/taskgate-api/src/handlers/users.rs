// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Handlers for the authenticated caller's own account.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::error::{ApiResult, ValidationErrors};
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{MessageResponse, ProfileResponse};
use crate::state::AppState;
use crate::validation::{Validate, check_not_empty, check_password, check_username};

// =============================================================================
// Profile
// =============================================================================

/// GET /users/profile
pub async fn profile(
    State(state): State<AppState>,
    Auth(identity): Auth,
) -> ApiResult<impl IntoResponse> {
    let account = state.sessions().profile(&identity).await?;
    Ok(Json(ProfileResponse::from(account)))
}

/// Profile update body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New username. Omitted leaves the profile unchanged.
    #[serde(default)]
    pub username: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(username) = &self.username {
            check_username("username", username, errors);
        }
    }
}

/// PATCH /users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(identity): Auth,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = match request.username {
        Some(username) => state.sessions().update_username(&identity, &username).await?,
        None => state.sessions().profile(&identity).await?,
    };

    Ok(Json(ProfileResponse::from(account)))
}

// =============================================================================
// Change Password
// =============================================================================

/// Change password body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self, errors: &mut ValidationErrors) {
        check_not_empty("currentPassword", &self.current_password, errors);
        check_password("newPassword", &self.new_password, errors);
    }
}

/// POST /users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Auth(identity): Auth,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions()
        .change_password(&identity, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new(
        "Your password has been changed successfully",
    )))
}

// =============================================================================
// Delete Account
// =============================================================================

/// Account deletion body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    /// Current password, as confirmation.
    pub confirmation_password: String,
}

impl Validate for DeleteAccountRequest {
    fn validate(&self, errors: &mut ValidationErrors) {
        check_not_empty("confirmationPassword", &self.confirmation_password, errors);
    }
}

/// DELETE /users/delete
pub async fn delete_account(
    State(state): State<AppState>,
    Auth(identity): Auth,
    ValidatedJson(request): ValidatedJson<DeleteAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions()
        .delete_account(&identity, &request.confirmation_password)
        .await?;

    Ok(Json(MessageResponse::new("Account deleted successfully.")))
}
