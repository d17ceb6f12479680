// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Canonical accounts, configurations and a ready-made session stack.

use std::sync::Arc;

use taskgate_api::ApiConfig;
use taskgate_core::{
    AccountStore, CredentialHasher, HashingConfig, InMemoryAccountStore, JwtConfig,
    RevocationStore, SessionConfig, SessionOrchestrator, TokenIssuer,
};

/// Signing secret shared by every fixture.
pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-at-least-32-chars";

/// Credentials that satisfy the signup rules.
pub struct Credentials {
    /// Login name.
    pub username: &'static str,
    /// Plaintext password.
    pub password: &'static str,
}

/// The primary test account.
pub const ALICE: Credentials = Credentials {
    username: "alice",
    password: "Str0ng!Pass1",
};

/// A second account.
pub const BRIAN: Credentials = Credentials {
    username: "brian_s",
    password: "P@ssw0rd1234",
};

/// A password that passes the format rules but belongs to nobody.
pub const OTHER_PASSWORD: &str = "Wr0ng!Passw0rd";

/// Formats an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// JWT configuration with the shared secret.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

/// API configuration with the shared secret and a fast hash.
pub fn test_api_config() -> ApiConfig {
    ApiConfig::default()
        .with_jwt(test_jwt_config())
        .with_hashing(HashingConfig::fast())
}

// =============================================================================
// SessionFixture
// =============================================================================

/// A session orchestrator together with the components it was built from.
pub struct SessionFixture {
    /// The orchestrator under test.
    pub sessions: SessionOrchestrator,
    /// The account store behind it.
    pub accounts: Arc<dyn AccountStore>,
    /// The revocation store behind it.
    pub revocations: Arc<RevocationStore>,
    /// An issuer sharing the orchestrator's key.
    pub issuer: TokenIssuer,
}

impl SessionFixture {
    /// Builds a fixture over an empty in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryAccountStore::new()))
    }

    /// Builds a fixture over `accounts`.
    pub fn with_store(accounts: Arc<dyn AccountStore>) -> Self {
        Self::build(accounts, test_jwt_config(), SessionConfig::default())
    }

    /// Builds a fixture with explicit JWT and session settings.
    pub fn build(accounts: Arc<dyn AccountStore>, jwt: JwtConfig, session: SessionConfig) -> Self {
        let issuer = TokenIssuer::new(jwt).expect("valid JWT config");
        let hasher = CredentialHasher::new(&HashingConfig::fast()).expect("valid hashing config");
        let revocations = Arc::new(RevocationStore::new());

        let sessions = SessionOrchestrator::new(
            accounts.clone(),
            hasher,
            issuer.clone(),
            revocations.clone(),
            session,
        );

        Self {
            sessions,
            accounts,
            revocations,
            issuer,
        }
    }

    /// Signs up `credentials` and returns the token.
    pub async fn signup(&self, credentials: &Credentials) -> String {
        self.sessions
            .signup(credentials.username, credentials.password)
            .await
            .expect("signup should succeed")
            .access_token
    }
}

impl Default for SessionFixture {
    fn default() -> Self {
        Self::new()
    }
}
