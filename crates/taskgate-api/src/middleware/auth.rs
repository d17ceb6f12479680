// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token enforcement middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, header},
    response::{IntoResponse, Response},
};
use taskgate_core::{AccessDecision, AccessGate};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::context::AuthContext;
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that runs every non-public request through the [`AccessGate`].
///
/// Allowed requests carry an [`AuthContext`] with the resolved identity in
/// their extensions. Denied requests are answered with 401 (or 500 when the
/// account store failed) and never reach the handler.
#[derive(Clone)]
pub struct AuthLayer {
    gate: AccessGate,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(gate: AccessGate) -> Self {
        Self {
            gate,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets the paths that don't require authentication.
    ///
    /// A trailing `*` matches any suffix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec!["/health".to_string(), "/auth/*".to_string()])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            gate: self.gate.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer token enforcement.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    gate: AccessGate,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let is_public = self.is_public_path(req.uri().path());
        let authorization = authorization_header(&req);

        // Drive the clone that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let request_id = Uuid::now_v7();

            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let auth_ctx = if is_public {
                AuthContext::anonymous()
            } else {
                match gate.authorize(authorization.as_deref()).await {
                    AccessDecision::Allowed(identity) => AuthContext::from_identity(identity),
                    AccessDecision::Denied(reason) => {
                        tracing::debug!(
                            request_id = %request_id,
                            path = %req.uri().path(),
                            reason = ?reason,
                            "Request rejected"
                        );
                        return Ok(ApiError::from(reason.into_error()).into_response());
                    }
                }
            };

            let auth_ctx = auth_ctx.with_request_id(request_id);
            let auth_ctx = match client_ip {
                Some(ip) => auth_ctx.with_client_ip(ip),
                None => auth_ctx,
            };

            req.extensions_mut().insert(auth_ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Copies the `Authorization` header out of the request.
///
/// A non-UTF-8 value becomes an empty string, which the gate rejects as
/// malformed.
fn authorization_header<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_string())
}

// =============================================================================
// Tests
// =============================================================================
