// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskgate_core::{Account, IssuedToken};
use uuid::Uuid;

// =============================================================================
// Auth Responses
// =============================================================================

/// Response carrying a freshly issued access token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// The signed access token.
    pub access_token: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.access_token,
        }
    }
}

/// Response of the token validation endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidityResponse {
    /// Always `true`; invalid tokens are answered with an error.
    pub valid: bool,
}

/// Plain confirmation message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Profile Response
// =============================================================================

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Account id.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Creation time.
    pub create_at: DateTime<Utc>,
    /// Last modification time.
    pub update_at: DateTime<Utc>,
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            create_at: account.created_at,
            update_at: account.updated_at,
        }
    }
}

// =============================================================================
// Health Response
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
    /// Number of tokens currently held as revoked.
    pub revoked_tokens: usize,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy(revoked_tokens: usize) -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
            revoked_tokens,
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
    fn test_token_response_is_camel_case() {
        let json = serde_json::to_value(TokenResponse {
            access_token: "t".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": "t" }));
    }

    #[test]
    fn test_profile_response_fields() {
        let account = Account::new("alice", "$argon2id$digest");
        let json = serde_json::to_value(ProfileResponse::from(account.clone())).unwrap();

        assert_eq!(json["id"], account.id.to_string());
        assert_eq!(json["username"], "alice");
        assert!(json.get("createAt").is_some());
        assert!(json.get("updateAt").is_some());
        assert!(json.get("password_hash").is_none());
    }
}
