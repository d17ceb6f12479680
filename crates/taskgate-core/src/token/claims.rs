// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject - the account id.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID. Unique per issued token.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Username at the time of issue.
    pub username: String,
}

impl Claims {
    /// Creates claims for an account, expiring `expires_in_secs` from now.
    pub fn new(account_id: Uuid, username: impl Into<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: account_id.to_string(),
            exp: now + expires_in_secs,
            iat: now,
            iss: None,
            jti: Uuid::now_v7().to_string(),
            username: username.into(),
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Returns the account id, if `sub` is a well-formed UUID.
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the time remaining until expiration.
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::from_secs((self.exp - now) as u64))
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let id = Uuid::now_v7();
        let claims = Claims::new(id, "alice", 3600);

        assert_eq!(claims.account_id(), Some(id));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::new(Uuid::now_v7(), "alice", -1);
        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());
    }

    #[test]
    fn test_jti_is_unique() {
        let id = Uuid::now_v7();
        let a = Claims::new(id, "alice", 3600);
        let b = Claims::new(id, "alice", 3600);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_non_uuid_subject() {
        let mut claims = Claims::new(Uuid::now_v7(), "alice", 3600);
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.account_id().is_none());
    }
}
