// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # HTTP Integration Tests
//!
//! Drives the full router, middleware included, through [`ApiHarness`].

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use taskgate_tests::common::{
    ALICE, ApiHarness, BRIAN, MockAccountStore, OTHER_PASSWORD, bearer, init_test_logging,
};

// =============================================================================
// Session Lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_session_lifecycle() {
    init_test_logging();
    let api = ApiHarness::new();

    let signup_token = api.signup(&ALICE).await;
    assert!(!signup_token.is_empty());

    let login = api.login(ALICE.username, ALICE.password).await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.access_token().unwrap().to_string();

    let validate = api.validate(&token).await;
    assert_eq!(validate.status, StatusCode::OK);
    assert_eq!(validate.body, json!({ "valid": true }));

    let profile = api.get("/users/profile", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["username"], ALICE.username);
    assert!(profile.body["id"].is_string());
    assert!(profile.body["createAt"].is_string());
    assert!(profile.body["updateAt"].is_string());
    assert!(profile.body.get("password").is_none());
    assert!(profile.body.get("passwordHash").is_none());

    let logout = api.post("/auth/logout", Some(&token), json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logout completed successfully");

    let validate = api.validate(&token).await;
    assert_eq!(validate.status, StatusCode::UNAUTHORIZED);
    assert_eq!(validate.error_message(), Some("Invalid or expired token"));

    let profile = api.get("/users/profile", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.error_message(), Some("Token has been revoked"));

    // The signup token was never logged out.
    assert_eq!(api.validate(&signup_token).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_revocations() {
    let api = ApiHarness::new();

    let health = api.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["revoked_tokens"], 0);

    let token = api.signup(&ALICE).await;
    api.post("/auth/logout", Some(&token), json!({})).await;

    let health = api.get("/health", None).await;
    assert_eq!(health.body["revoked_tokens"], 1);
    assert_eq!(api.state().sessions().revocations().len(), 1);
}

// =============================================================================
// Auth Errors
// =============================================================================

#[tokio::test]
async fn test_login_bad_credentials() {
    let api = ApiHarness::new();
    api.signup(&ALICE).await;

    let wrong_password = api.login(ALICE.username, OTHER_PASSWORD).await;
    let unknown_user = api.login(BRIAN.username, BRIAN.password).await;

    for response in [&wrong_password, &unknown_user] {
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error_code(), Some("NOT_FOUND"));
        assert_eq!(response.error_message(), Some("Username or password invalid"));
    }
}

#[tokio::test]
async fn test_signup_conflict() {
    let api = ApiHarness::new();
    api.signup(&ALICE).await;

    let response = api
        .post(
            "/auth/signup",
            None,
            json!({ "username": ALICE.username, "password": BRIAN.password }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), Some("CONFLICT"));
    assert_eq!(response.error_message(), Some("Username already registered"));
}

#[tokio::test]
async fn test_signup_rejects_bad_format() {
    let api = ApiHarness::new();

    let response = api
        .post(
            "/auth/signup",
            None,
            json!({ "username": "a b", "password": "weakpass" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));

    let fields = response.body["error"]["details"]["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "username"));
    assert!(fields.iter().any(|f| f["field"] == "password"));

    // Nothing was created.
    let login = api.login("a b", "weakpass").await;
    assert_ne!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_json() {
    let api = ApiHarness::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username": "#))
        .unwrap();
    let response = api.send_raw(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("BAD_REQUEST"));
}

#[tokio::test]
async fn test_header_errors() {
    let api = ApiHarness::new();

    let missing = api.get("/users/profile", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), Some("UNAUTHORIZED"));
    assert_eq!(missing.error_message(), Some("Authorization header not found"));

    let malformed = api
        .send(Method::GET, "/users/profile", Some("Token abc"), None)
        .await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        malformed.error_message(),
        Some("Invalid authorization header format")
    );

    let validate = api
        .send(Method::POST, "/auth/validate-token", None, None)
        .await;
    assert_eq!(validate.status, StatusCode::UNAUTHORIZED);
    assert_eq!(validate.error_message(), Some("Authorization header not found"));

    let logout = api
        .send(Method::POST, "/auth/logout", Some("Bearer"), None)
        .await;
    assert_eq!(logout.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        logout.error_message(),
        Some("Invalid authorization header format")
    );
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let api = ApiHarness::new();

    let profile = api.get("/users/profile", Some("not-a-token")).await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);

    let validate = api.validate("not-a-token").await;
    assert_eq!(validate.status, StatusCode::UNAUTHORIZED);
    assert_eq!(validate.error_message(), Some("Invalid or expired token"));
}

// =============================================================================
// Account Management
// =============================================================================

#[tokio::test]
async fn test_update_profile() {
    let api = ApiHarness::new();
    let token = api.signup(&ALICE).await;
    api.signup(&BRIAN).await;

    let taken = api
        .send(
            Method::PATCH,
            "/users/profile",
            Some(&bearer(&token)),
            Some(json!({ "username": BRIAN.username })),
        )
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let unchanged = api
        .send(Method::PATCH, "/users/profile", Some(&bearer(&token)), Some(json!({})))
        .await;
    assert_eq!(unchanged.status, StatusCode::OK);
    assert_eq!(unchanged.body["username"], ALICE.username);

    let renamed = api
        .send(
            Method::PATCH,
            "/users/profile",
            Some(&bearer(&token)),
            Some(json!({ "username": "alice.w" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["username"], "alice.w");

    assert_eq!(api.login("alice.w", ALICE.password).await.status, StatusCode::OK);
    assert_eq!(
        api.login(ALICE.username, ALICE.password).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_change_password() {
    let api = ApiHarness::new();
    let token = api.signup(&ALICE).await;

    let wrong = api
        .post(
            "/users/change-password",
            Some(&token),
            json!({ "currentPassword": OTHER_PASSWORD, "newPassword": BRIAN.password }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_message(), Some("Current password is incorrect"));

    let weak = api
        .post(
            "/users/change-password",
            Some(&token),
            json!({ "currentPassword": ALICE.password, "newPassword": "short" }),
        )
        .await;
    assert_eq!(weak.status, StatusCode::UNPROCESSABLE_ENTITY);

    let changed = api
        .post(
            "/users/change-password",
            Some(&token),
            json!({ "currentPassword": ALICE.password, "newPassword": BRIAN.password }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(
        changed.body["message"],
        "Your password has been changed successfully"
    );

    assert_eq!(
        api.login(ALICE.username, ALICE.password).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(api.login(ALICE.username, BRIAN.password).await.status, StatusCode::OK);
    assert_eq!(api.validate(&token).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account() {
    let api = ApiHarness::new();
    let token = api.signup(&ALICE).await;
    let other = api
        .login(ALICE.username, ALICE.password)
        .await
        .access_token()
        .unwrap()
        .to_string();

    let wrong = api
        .send(
            Method::DELETE,
            "/users/delete",
            Some(&bearer(&token)),
            Some(json!({ "confirmationPassword": OTHER_PASSWORD })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let deleted = api
        .send(
            Method::DELETE,
            "/users/delete",
            Some(&bearer(&token)),
            Some(json!({ "confirmationPassword": ALICE.password })),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Account deleted successfully.");

    assert_eq!(
        api.get("/users/profile", Some(&token)).await.error_message(),
        Some("Token has been revoked")
    );
    assert_eq!(
        api.get("/users/profile", Some(&other)).await.error_message(),
        Some("User not found or inactive")
    );
    assert_eq!(
        api.login(ALICE.username, ALICE.password).await.status,
        StatusCode::NOT_FOUND
    );

    // The name is free again.
    api.signup(&ALICE).await;
}

// =============================================================================
// Store Failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_is_internal() {
    let store = Arc::new(MockAccountStore::new());
    let api = ApiHarness::with_store(store.clone());
    let token = api.signup(&ALICE).await;

    store.fail_reads(true);

    let login = api.login(ALICE.username, ALICE.password).await;
    assert_eq!(login.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(login.error_code(), Some("INTERNAL_ERROR"));
    assert_eq!(login.error_message(), Some("Internal server error"));

    let profile = api.get("/users/profile", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(profile.error_message(), Some("Internal server error"));

    store.fail_reads(false);
    assert_eq!(api.login(ALICE.username, ALICE.password).await.status, StatusCode::OK);
}
