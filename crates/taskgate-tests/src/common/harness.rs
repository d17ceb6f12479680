// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Drives the full axum router in process, one request at a time.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use taskgate_api::{ApiConfig, ApiServerBuilder, AppState};
use taskgate_core::AccountStore;
use tower::ServiceExt;

use super::fixtures::{Credentials, bearer, test_api_config};

/// Largest body the harness will read back.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// JSON body, or `Value::Null` if the body was empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// Returns the `error.message` field of an error body.
    pub fn error_message(&self) -> Option<&str> {
        self.body["error"]["message"].as_str()
    }

    /// Returns the `error.code` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }

    /// Returns the `accessToken` field of a token body.
    pub fn access_token(&self) -> Option<&str> {
        self.body["accessToken"].as_str()
    }
}

/// In-process HTTP harness.
pub struct ApiHarness {
    router: Router,
    state: AppState,
}

impl ApiHarness {
    /// Creates a harness with the test configuration and an in-memory store.
    pub fn new() -> Self {
        Self::from_builder(ApiServerBuilder::new().config(test_api_config()))
    }

    /// Creates a harness with a custom configuration.
    pub fn with_config(config: ApiConfig) -> Self {
        Self::from_builder(ApiServerBuilder::new().config(config))
    }

    /// Creates a harness over a custom account store.
    pub fn with_store(store: Arc<dyn AccountStore>) -> Self {
        Self::from_builder(
            ApiServerBuilder::new()
                .config(test_api_config())
                .account_store(store),
        )
    }

    fn from_builder(builder: ApiServerBuilder) -> Self {
        let server = builder.build().expect("server should build");
        Self {
            router: server.router(),
            state: server.state().clone(),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Sends a request and decodes the response.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.send_raw(request).await
    }

    /// Sends a prebuilt request.
    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_RESPONSE_BYTES)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// `POST` with a JSON body.
    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let authorization = token.map(bearer);
        self.send(Method::POST, uri, authorization.as_deref(), Some(body))
            .await
    }

    /// `GET` with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let authorization = token.map(bearer);
        self.send(Method::GET, uri, authorization.as_deref(), None).await
    }

    /// Signs up `credentials` and returns the token.
    pub async fn signup(&self, credentials: &Credentials) -> String {
        let response = self
            .post(
                "/auth/signup",
                None,
                serde_json::json!({
                    "username": credentials.username,
                    "password": credentials.password,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response
            .access_token()
            .expect("signup returns a token")
            .to_string()
    }

    /// Logs in with `credentials`.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/login",
            None,
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Calls the token validation endpoint.
    pub async fn validate(&self, token: &str) -> TestResponse {
        let authorization = bearer(token);
        self.send(
            Method::POST,
            "/auth/validate-token",
            Some(&authorization),
            None,
        )
        .await
    }
}

impl Default for ApiHarness {
    fn default() -> Self {
        Self::new()
    }
}
