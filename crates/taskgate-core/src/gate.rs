// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request bearer token enforcement.
//!
//! [`AccessGate::authorize`] is the single decision point for protected
//! routes. Checks run in a fixed order and the first failure wins:
//!
//! 1. header present
//! 2. header is `Bearer <token>`
//! 3. signature, issuer and expiry verify
//! 4. token not revoked
//! 5. subject account still exists

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::account::AccountStore;
use crate::error::{AuthError, TokenError};
use crate::revocation::RevocationStore;
use crate::token::{Claims, TokenIssuer};

const BEARER_SCHEME: &str = "Bearer";

/// Extracts the token from an `Authorization` header value.
///
/// The value must be exactly two space-separated parts, the first being
/// `Bearer` and the second non-empty.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Parses an optional header, distinguishing absent from malformed.
pub(crate) fn require_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    parse_bearer(header.ok_or(AuthError::MissingHeader)?)
}

// =============================================================================
// Identity
// =============================================================================

/// The caller resolved from an accepted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account id (the token subject).
    pub account_id: Uuid,
    /// Current username of the account.
    pub username: String,
    /// The presented token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// AccessDecision
// =============================================================================

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No `Authorization` header.
    MissingHeader,
    /// Header is not `Bearer <token>`.
    MalformedHeader,
    /// Token failed verification.
    InvalidToken(TokenError),
    /// Token was revoked.
    Revoked,
    /// Token subject no longer exists.
    SubjectGone,
    /// The account store could not be reached.
    Internal(String),
}

impl DenyReason {
    /// Converts the reason into the matching error.
    pub fn into_error(self) -> AuthError {
        match self {
            Self::MissingHeader => AuthError::MissingHeader,
            Self::MalformedHeader => AuthError::MalformedHeader,
            Self::InvalidToken(err) => err.into(),
            Self::Revoked => AuthError::RevokedToken,
            Self::SubjectGone => AuthError::SubjectGone,
            Self::Internal(message) => AuthError::Internal(message),
        }
    }

    /// Returns `true` if the denial is a server fault rather than a rejection.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<AuthError> for DenyReason {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader => Self::MissingHeader,
            AuthError::MalformedHeader => Self::MalformedHeader,
            AuthError::MalformedToken => Self::InvalidToken(TokenError::malformed("malformed")),
            AuthError::ExpiredToken => Self::InvalidToken(TokenError::Expired),
            AuthError::RevokedToken => Self::Revoked,
            AuthError::SubjectGone => Self::SubjectGone,
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Outcome of [`AccessGate::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The caller may proceed.
    Allowed(Identity),
    /// The caller must be rejected.
    Denied(DenyReason),
}

impl AccessDecision {
    /// Returns the identity if allowed.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Allowed(identity) => Some(identity),
            Self::Denied(_) => None,
        }
    }

    /// Returns `true` if allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Converts into a result.
    pub fn into_result(self) -> Result<Identity, AuthError> {
        match self {
            Self::Allowed(identity) => Ok(identity),
            Self::Denied(reason) => Err(reason.into_error()),
        }
    }
}

// =============================================================================
// AccessGate
// =============================================================================

/// Decides whether a bearer token grants access.
#[derive(Clone)]
pub struct AccessGate {
    issuer: TokenIssuer,
    revocations: Arc<RevocationStore>,
    accounts: Arc<dyn AccountStore>,
}

impl AccessGate {
    /// Creates a gate over the given components.
    pub fn new(
        issuer: TokenIssuer,
        revocations: Arc<RevocationStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            issuer,
            revocations,
            accounts,
        }
    }

    /// Verifies a bare token and checks it against the revocation store.
    ///
    /// Does not consult the account store.
    pub fn check_token(&self, token: &str) -> Result<Claims, DenyReason> {
        let claims = self.issuer.verify(token).map_err(DenyReason::InvalidToken)?;

        if self.revocations.is_revoked(token) {
            return Err(DenyReason::Revoked);
        }

        Ok(claims)
    }

    /// Authorizes a request given its raw `Authorization` header value.
    pub async fn authorize(&self, authorization: Option<&str>) -> AccessDecision {
        match self.resolve(authorization).await {
            Ok(identity) => AccessDecision::Allowed(identity),
            Err(reason) => {
                debug!(reason = ?reason, "Access denied");
                AccessDecision::Denied(reason)
            }
        }
    }

    async fn resolve(&self, authorization: Option<&str>) -> Result<Identity, DenyReason> {
        let token = require_bearer(authorization)?;
        let claims = self.check_token(token)?;

        let account_id = claims
            .account_id()
            .ok_or_else(|| DenyReason::InvalidToken(TokenError::malformed("subject is not an id")))?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await
            .map_err(|e| DenyReason::Internal(e.to_string()))?
            .ok_or(DenyReason::SubjectGone)?;

        Ok(Identity {
            account_id: account.id,
            username: account.username,
            token: token.to_string(),
            expires_at: claims.expires_at().unwrap_or_else(Utc::now),
        })
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("issuer", &self.issuer)
            .field("revoked", &self.revocations.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::account::InMemoryAccountStore;
    use crate::token::JwtConfig;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(JwtConfig::new("gate-test-secret-that-is-long-enough")).unwrap()
    }

    struct Fixture {
        gate: AccessGate,
        issuer: TokenIssuer,
        revocations: Arc<RevocationStore>,
        accounts: Arc<InMemoryAccountStore>,
    }

    fn fixture() -> Fixture {
        let issuer = issuer();
        let revocations = Arc::new(RevocationStore::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gate = AccessGate::new(issuer.clone(), revocations.clone(), accounts.clone());
        Fixture {
            gate,
            issuer,
            revocations,
            accounts,
        }
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
        assert!(matches!(parse_bearer("Bearer"), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer("Bearer "), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer("bearer abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer("Basic abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer("Bearer a b"), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer("Bearer  abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(parse_bearer(""), Err(AuthError::MalformedHeader)));
    }

    #[tokio::test]
    async fn test_allows_valid_token() {
        let fx = fixture();
        let account = fx.accounts.create("alice", "digest").await.unwrap();
        let token = fx.issuer.issue_default(account.id, "alice").unwrap();

        let decision = fx.gate.authorize(Some(&format!("Bearer {token}"))).await;
        let identity = decision.identity().unwrap();

        assert_eq!(identity.account_id, account.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.token, token);
    }

    #[tokio::test]
    async fn test_denial_order() {
        let fx = fixture();

        assert_eq!(
            fx.gate.authorize(None).await,
            AccessDecision::Denied(DenyReason::MissingHeader)
        );
        assert_eq!(
            fx.gate.authorize(Some("Token abc")).await,
            AccessDecision::Denied(DenyReason::MalformedHeader)
        );
        assert!(matches!(
            fx.gate.authorize(Some("Bearer not-a-jwt")).await,
            AccessDecision::Denied(DenyReason::InvalidToken(TokenError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_denied() {
        let fx = fixture();
        let account = fx.accounts.create("alice", "digest").await.unwrap();
        let claims = Claims::new(account.id, "alice", -60).with_issuer("taskgate");
        let token = fx.issuer.sign(&claims).unwrap();

        assert_eq!(
            fx.gate.authorize(Some(&format!("Bearer {token}"))).await,
            AccessDecision::Denied(DenyReason::InvalidToken(TokenError::Expired))
        );
    }

    #[tokio::test]
    async fn test_non_id_subject_denied() {
        let fx = fixture();
        let mut claims = Claims::new(Uuid::new_v4(), "alice", 3600).with_issuer("taskgate");
        claims.sub = "not-a-uuid".to_string();
        let token = fx.issuer.sign(&claims).unwrap();

        assert!(matches!(
            fx.gate.authorize(Some(&format!("Bearer {token}"))).await,
            AccessDecision::Denied(DenyReason::InvalidToken(TokenError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_denied() {
        let fx = fixture();
        let account = fx.accounts.create("alice", "digest").await.unwrap();
        let token = fx.issuer.issue_default(account.id, "alice").unwrap();

        fx.revocations.revoke(&token, Duration::from_secs(60));

        assert_eq!(
            fx.gate.authorize(Some(&format!("Bearer {token}"))).await,
            AccessDecision::Denied(DenyReason::Revoked)
        );
    }

    #[tokio::test]
    async fn test_deleted_subject_denied() {
        let fx = fixture();
        let account = fx.accounts.create("alice", "digest").await.unwrap();
        let token = fx.issuer.issue_default(account.id, "alice").unwrap();

        fx.accounts.delete(account.id).await.unwrap();

        assert_eq!(
            fx.gate.authorize(Some(&format!("Bearer {token}"))).await,
            AccessDecision::Denied(DenyReason::SubjectGone)
        );
    }

    #[tokio::test]
    async fn test_identity_uses_current_username() {
        let fx = fixture();
        let account = fx.accounts.create("alice", "digest").await.unwrap();
        let token = fx.issuer.issue_default(account.id, "alice").unwrap();

        fx.accounts.update_username(account.id, "alicia").await.unwrap();

        let identity = fx
            .gate
            .authorize(Some(&format!("Bearer {token}")))
            .await
            .into_result()
            .unwrap();
        assert_eq!(identity.username, "alicia");
    }

    #[test]
    fn test_deny_reason_into_error() {
        assert!(matches!(
            DenyReason::Revoked.into_error(),
            AuthError::RevokedToken
        ));
        assert!(matches!(
            DenyReason::InvalidToken(TokenError::Expired).into_error(),
            AuthError::ExpiredToken
        ));
        assert!(DenyReason::Internal("down".into()).into_error().is_internal());
    }
}
