// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request authentication context.

use std::net::IpAddr;

use taskgate_core::Identity;
use uuid::Uuid;

/// Authentication context for a request.
///
/// Inserted into request extensions by the auth middleware. Public paths get
/// an anonymous context so request ids and client addresses are always
/// available downstream.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Resolved caller, `None` on public paths.
    pub identity: Option<Identity>,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context for an authenticated caller.
    pub fn from_identity(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an anonymous context (for unauthenticated requests).
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if this is an anonymous context.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns the account id of the caller.
    pub fn account_id(&self) -> Option<Uuid> {
        self.identity.as_ref().map(|identity| identity.account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_anonymous() {
        let ctx = AuthContext::anonymous();
        assert!(ctx.is_anonymous());
        assert!(ctx.account_id().is_none());
    }

    #[test]
    fn test_from_identity() {
        let id = Uuid::now_v7();
        let request_id = Uuid::now_v7();
        let ctx = AuthContext::from_identity(Identity {
            account_id: id,
            username: "alice".to_string(),
            token: "t".to_string(),
            expires_at: Utc::now(),
        })
        .with_request_id(request_id)
        .with_client_ip("127.0.0.1".parse().unwrap());

        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.account_id(), Some(id));
        assert_eq!(ctx.request_id, request_id);
        assert!(ctx.client_ip.is_some());
    }
}
