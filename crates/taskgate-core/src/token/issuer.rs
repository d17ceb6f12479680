// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT signing and verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Claims;
use crate::error::{AuthError, AuthResult, TokenError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Secrets shorter than this are accepted but logged.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted, one year.
pub const MAX_EXPIRATION_SECS: u64 = 366 * 24 * 60 * 60;

/// Largest clock skew tolerance accepted.
pub const MAX_LEEWAY_SECS: u64 = 5 * 60;

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Default token lifetime in seconds.
    pub expiration_secs: u64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "taskgate".to_string(),
            expiration_secs: 3600,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the default token lifetime.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs();
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, duration: Duration) -> Self {
        self.leeway_secs = duration.as_secs();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::configuration("JWT secret is not configured"));
        }
        if self.expiration_secs == 0 {
            return Err(AuthError::configuration(
                "JWT expiration must be greater than zero",
            ));
        }
        if self.expiration_secs > MAX_EXPIRATION_SECS {
            return Err(AuthError::configuration(format!(
                "JWT expiration must not exceed {} seconds",
                MAX_EXPIRATION_SECS
            )));
        }
        if self.leeway_secs > MAX_LEEWAY_SECS {
            return Err(AuthError::configuration(format!(
                "JWT leeway must not exceed {} seconds",
                MAX_LEEWAY_SECS
            )));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "JWT secret is shorter than recommended ({} bytes)",
                RECOMMENDED_SECRET_LEN
            );
        }
        Ok(())
    }
}

// =============================================================================
// TokenIssuer
// =============================================================================

/// Signs and verifies access tokens.
///
/// Keys are derived once from the configured secret and shared between clones.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    validation_ignoring_expiry: Arc<Validation>,
}

impl TokenIssuer {
    /// Creates a new issuer with the given configuration.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        let mut validation_ignoring_expiry = validation.clone();
        validation_ignoring_expiry.validate_exp = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            validation_ignoring_expiry: Arc::new(validation_ignoring_expiry),
        })
    }

    /// Signs the given claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issues a token for an account that expires after `ttl`.
    ///
    /// Fails if `ttl` is longer than [`MAX_EXPIRATION_SECS`].
    pub fn issue(
        &self,
        account_id: Uuid,
        username: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let expires_in = i64::try_from(ttl.as_secs())
            .ok()
            .filter(|secs| *secs as u64 <= MAX_EXPIRATION_SECS)
            .ok_or_else(|| {
                TokenError::Signing(format!("token lifetime of {}s is out of range", ttl.as_secs()))
            })?;

        let claims =
            Claims::new(account_id, username, expires_in).with_issuer(&self.config.issuer);

        self.sign(&claims)
    }

    /// Issues a token with the configured default lifetime.
    pub fn issue_default(&self, account_id: Uuid, username: &str) -> Result<String, TokenError> {
        self.issue(account_id, username, self.default_ttl())
    }

    /// Verifies the signature, issuer and expiry of a token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Verifies the signature and issuer of a token without checking expiry.
    ///
    /// Used to learn the natural expiry of a token being revoked.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation_ignoring_expiry)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Returns the default token lifetime.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.config.expiration_secs)
    }

    /// Returns the clock skew tolerance applied on verification.
    pub fn leeway(&self) -> Duration {
        Duration::from_secs(self.config.leeway_secs)
    }

    /// Returns the issuer name.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken => TokenError::malformed("invalid token format"),
        ErrorKind::InvalidSignature => TokenError::malformed("invalid token signature"),
        ErrorKind::InvalidIssuer => TokenError::malformed("invalid token issuer"),
        ErrorKind::InvalidAlgorithm => TokenError::malformed("unexpected signing algorithm"),
        _ => TokenError::malformed(format!("token validation failed: {}", err)),
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &ALGORITHM)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(JwtConfig::new(SECRET)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let id = Uuid::now_v7();

        let token = issuer.issue_default(id, "alice").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.account_id(), Some(id));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss.as_deref(), Some("taskgate"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let issuer = issuer();
        let id = Uuid::now_v7();

        let a = issuer.issue_default(id, "alice").unwrap();
        let b = issuer.issue_default(id, "alice").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let claims = Claims::new(Uuid::now_v7(), "alice", -3600).with_issuer("taskgate");
        let token = issuer.sign(&claims).unwrap();

        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_ignoring_expiry() {
        let issuer = issuer();
        let claims = Claims::new(Uuid::now_v7(), "alice", -3600).with_issuer("taskgate");
        let token = issuer.sign(&claims).unwrap();

        let decoded = issuer.verify_ignoring_expiry(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_garbage_token() {
        let result = issuer().verify("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let a = TokenIssuer::new(JwtConfig::new("secret-one-for-testing-purposes")).unwrap();
        let b = TokenIssuer::new(JwtConfig::new("secret-two-for-testing-purposes")).unwrap();

        let token = a.issue_default(Uuid::now_v7(), "alice").unwrap();

        assert!(matches!(b.verify(&token), Err(TokenError::Malformed(_))));
        assert!(matches!(
            b.verify_ignoring_expiry(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = issuer();
        let token = issuer.issue_default(Uuid::now_v7(), "alice").unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = Claims::new(Uuid::now_v7(), "mallory", 86_400 * 365).with_issuer("taskgate");
        let forged_token = issuer.sign(&forged).unwrap();
        parts[1] = forged_token.split('.').nth(1).unwrap().to_string();

        let tampered = parts.join(".");
        assert!(matches!(
            issuer.verify(&tampered),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let a = TokenIssuer::new(JwtConfig::new(SECRET).with_issuer("someone-else")).unwrap();
        let b = issuer();

        let token = a.issue_default(Uuid::now_v7(), "alice").unwrap();
        assert!(matches!(b.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenIssuer::new(JwtConfig::default());
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_zero_expiration_rejected() {
        let config = JwtConfig::new(SECRET).with_expiration(Duration::ZERO);
        assert!(matches!(
            TokenIssuer::new(config),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_oversized_expiration_rejected() {
        let config = JwtConfig::new(SECRET).with_expiration(Duration::from_secs(u64::MAX));
        assert!(matches!(config.validate(), Err(AuthError::Configuration(_))));
        assert!(matches!(
            TokenIssuer::new(config),
            Err(AuthError::Configuration(_))
        ));

        let config =
            JwtConfig::new(SECRET).with_expiration(Duration::from_secs(MAX_EXPIRATION_SECS + 1));
        assert!(matches!(config.validate(), Err(AuthError::Configuration(_))));

        let config = JwtConfig::new(SECRET).with_expiration(Duration::from_secs(MAX_EXPIRATION_SECS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_leeway_rejected() {
        let config = JwtConfig::new(SECRET).with_leeway(Duration::from_secs(u64::MAX));
        assert!(matches!(config.validate(), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_issue_rejects_out_of_range_ttl() {
        let issuer = issuer();
        let id = Uuid::now_v7();

        for ttl in [u64::MAX, i64::MAX as u64 + 1, MAX_EXPIRATION_SECS + 1] {
            let result = issuer.issue(id, "alice", Duration::from_secs(ttl));
            assert!(matches!(result, Err(TokenError::Signing(_))), "ttl {}", ttl);
        }

        let token = issuer
            .issue(id, "alice", Duration::from_secs(MAX_EXPIRATION_SECS))
            .unwrap();
        assert!(issuer.verify(&token).is_ok());
    }
}
