// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use taskgate_core::Identity;

use crate::context::AuthContext;
use crate::error::{ApiError, ValidationErrors};
use crate::validation::Validate;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Yields the identity resolved by the auth middleware. Returns 401 if the
/// request was not authenticated.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(identity): Auth) -> impl IntoResponse {
///     format!("Hello, {}", identity.username)
/// }
/// ```
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone())
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Authorization Header Extractor
// =============================================================================

/// The raw `Authorization` header value.
///
/// Used by public endpoints that interpret the bearer token themselves. A
/// value that is not valid UTF-8 is passed on as an empty string so it is
/// rejected as malformed rather than missing.
pub struct AuthorizationHeader(pub Option<String>);

impl AuthorizationHeader {
    /// Returns the header value as a string slice.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for AuthorizationHeader
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default().to_string());
        Ok(AuthorizationHeader(value))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for validated JSON payloads.
///
/// Bodies that do not deserialize are rejected with 400. Bodies that
/// deserialize but break a field rule are rejected with 422 and the list of
/// field errors.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        let mut errors = ValidationErrors::new();
        value.validate(&mut errors);
        errors.into_result(ValidatedJson(value))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        let ip = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip);

        Ok(ClientIp(ip))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use serde::Deserialize;

    use crate::validation::check_username;

    #[derive(Debug, Deserialize)]
    struct Named {
        username: String,
    }

    impl Validate for Named {
        fn validate(&self, errors: &mut ValidationErrors) {
            check_username("username", &self.username, errors);
        }
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_validated_json_accepts_valid_body() {
        let ValidatedJson(named) =
            ValidatedJson::<Named>::from_request(json_request(r#"{"username":"alice"}"#), &())
                .await
                .unwrap();
        assert_eq!(named.username, "alice");
    }

    #[tokio::test]
    async fn test_validated_json_rejects_rule_violation() {
        let err = ValidatedJson::<Named>::from_request(json_request(r#"{"username":"a"}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_validated_json_rejects_bad_json() {
        let err = ValidatedJson::<Named>::from_request(json_request(r#"{"username":"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ValidatedJson::<Named>::from_request(json_request(r#"{}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authorization_header() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();

        let AuthorizationHeader(value) =
            AuthorizationHeader::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(value.is_none());

        parts.headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc"),
        );
        let AuthorizationHeader(value) =
            AuthorizationHeader::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(value.as_deref(), Some("Bearer abc"));

        parts.headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );
        let AuthorizationHeader(value) =
            AuthorizationHeader::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(value.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_auth_requires_identity() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(AuthContext::anonymous());

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
