// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login, signup, logout and token validation.
//!
//! [`SessionOrchestrator`] composes the hasher, the token issuer, the
//! revocation store and the account store. Password hashing is CPU-bound and
//! runs on tokio's blocking pool so it never stalls request handling.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::account::{Account, AccountStore};
use crate::error::{AuthError, AuthResult, StoreError};
use crate::gate::{AccessGate, Identity, require_bearer};
use crate::hasher::CredentialHasher;
use crate::revocation::RevocationStore;
use crate::token::{Claims, MAX_EXPIRATION_SECS, TokenIssuer};

// =============================================================================
// SessionConfig
// =============================================================================

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum time a logged-out token stays revoked, in seconds.
    pub revocation_ttl_secs: u64,
    /// How often lapsed revocations are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            revocation_ttl_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    /// Returns the minimum revocation lifetime.
    pub fn revocation_ttl(&self) -> Duration {
        Duration::from_secs(self.revocation_ttl_secs)
    }

    /// Returns the sweep interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.revocation_ttl_secs == 0 {
            return Err(AuthError::configuration(
                "session.revocation_ttl_secs must be greater than zero",
            ));
        }
        if self.revocation_ttl_secs > MAX_EXPIRATION_SECS {
            return Err(AuthError::configuration(format!(
                "session.revocation_ttl_secs must not exceed {} seconds",
                MAX_EXPIRATION_SECS
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(AuthError::configuration(
                "session.sweep_interval_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// IssuedToken
// =============================================================================

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The signed token.
    pub access_token: String,
    /// The account it was issued to.
    pub account_id: Uuid,
}

// =============================================================================
// SessionOrchestrator
// =============================================================================

/// Entry point for every session operation.
#[derive(Clone)]
pub struct SessionOrchestrator {
    accounts: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    revocations: Arc<RevocationStore>,
    gate: AccessGate,
    config: SessionConfig,
}

impl SessionOrchestrator {
    /// Creates an orchestrator over the given components.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: CredentialHasher,
        issuer: TokenIssuer,
        revocations: Arc<RevocationStore>,
        config: SessionConfig,
    ) -> Self {
        let gate = AccessGate::new(issuer.clone(), revocations.clone(), accounts.clone());

        Self {
            accounts,
            hasher,
            issuer,
            revocations,
            gate,
            config,
        }
    }

    /// Returns the gate sharing this orchestrator's components.
    pub fn access_gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Returns the revocation store.
    pub fn revocations(&self) -> &Arc<RevocationStore> {
        &self.revocations
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchanges credentials for an access token.
    ///
    /// Unknown usernames and wrong passwords fail identically and take about
    /// the same time.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        let Some(account) = self.accounts.find_by_username(username).await? else {
            self.verify_dummy_blocking(password).await;
            debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_blocking(password, &account.password_hash).await? {
            debug!(account_id = %account.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue(&account)?;
        info!(account_id = %account.id, "Login succeeded");
        Ok(issued)
    }

    /// Registers an account and logs it in.
    pub async fn signup(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        let digest = self.hash_blocking(password).await?;
        let account = self.accounts.create(username, &digest).await?;

        let issued = self.issue(&account)?;
        info!(account_id = %account.id, "Account registered");
        Ok(issued)
    }

    /// Revokes the token carried by an `Authorization` header.
    ///
    /// Succeeds for any well-formed header. Tokens that fail signature
    /// verification are already rejected everywhere and are not stored.
    pub async fn logout(&self, authorization: Option<&str>) -> AuthResult<()> {
        let token = require_bearer(authorization)?;
        self.revoke_token(token);
        info!("Logout completed");
        Ok(())
    }

    /// Checks that the token carried by an `Authorization` header would be
    /// accepted.
    ///
    /// Does not check that the subject still exists.
    pub async fn validate_token(&self, authorization: Option<&str>) -> AuthResult<()> {
        let token = require_bearer(authorization)?;

        self.gate.check_token(token).map(|_| ()).map_err(|reason| {
            debug!(reason = ?reason, "Token validation failed");
            AuthError::InvalidOrExpired
        })
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Returns the account behind an identity.
    pub async fn profile(&self, identity: &Identity) -> AuthResult<Account> {
        self.accounts
            .find_by_id(identity.account_id)
            .await?
            .ok_or(AuthError::SubjectGone)
    }

    /// Renames the account behind an identity.
    pub async fn update_username(&self, identity: &Identity, username: &str) -> AuthResult<Account> {
        let account = self
            .accounts
            .update_username(identity.account_id, username)
            .await
            .map_err(subject_error)?;

        info!(account_id = %account.id, "Username updated");
        Ok(account)
    }

    /// Replaces the password after confirming the current one.
    ///
    /// Tokens already issued stay valid.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let account = self.profile(identity).await?;
        self.confirm_password(&account, current_password).await?;

        let digest = self.hash_blocking(new_password).await?;
        self.accounts
            .update_password(account.id, &digest)
            .await
            .map_err(subject_error)?;

        info!(account_id = %account.id, "Password changed");
        Ok(())
    }

    /// Deletes the account behind an identity after confirming its password.
    ///
    /// The presenting token is revoked; any other token for the account is
    /// rejected by the gate once the account is gone.
    pub async fn delete_account(
        &self,
        identity: &Identity,
        confirmation_password: &str,
    ) -> AuthResult<()> {
        let account = self.profile(identity).await?;
        self.confirm_password(&account, confirmation_password).await?;

        self.accounts
            .delete(account.id)
            .await
            .map_err(subject_error)?;
        self.revoke_token(&identity.token);

        info!(account_id = %account.id, "Account deleted");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn issue(&self, account: &Account) -> AuthResult<IssuedToken> {
        let access_token = self.issuer.issue_default(account.id, &account.username)?;
        Ok(IssuedToken {
            access_token,
            account_id: account.id,
        })
    }

    async fn confirm_password(&self, account: &Account, password: &str) -> AuthResult<()> {
        if self.verify_blocking(password, &account.password_hash).await? {
            Ok(())
        } else {
            debug!(account_id = %account.id, "Password confirmation failed");
            Err(AuthError::IncorrectPassword)
        }
    }

    fn revoke_token(&self, token: &str) {
        match self.issuer.verify_ignoring_expiry(token) {
            Ok(claims) => match self.revocation_ttl_for(&claims) {
                Some(ttl) => self.revocations.revoke(token, ttl),
                None => debug!("Token already expired, nothing to revoke"),
            },
            Err(e) => debug!(error = %e, "Unverifiable token not stored"),
        }
    }

    /// How long a token must stay revoked: until it would expire on its own,
    /// but never less than the configured minimum. `None` if the token is
    /// already past expiry.
    fn revocation_ttl_for(&self, claims: &Claims) -> Option<Duration> {
        let leeway = self.issuer.leeway().as_secs() as i64;
        let remaining = claims.exp.saturating_add(leeway) - Utc::now().timestamp();

        if remaining < 0 {
            return None;
        }

        // Expiry is checked at whole-second granularity.
        let natural = Duration::from_secs(remaining as u64 + 1);
        Some(natural.max(self.config.revocation_ttl()))
    }

    async fn hash_blocking(&self, plaintext: &str) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_owned();

        let digest = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::internal(format!("hashing task failed: {}", e)))??;

        Ok(digest)
    }

    async fn verify_blocking(&self, plaintext: &str, digest: &str) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();

        let matched = tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|e| AuthError::internal(format!("verification task failed: {}", e)))??;

        Ok(matched)
    }

    async fn verify_dummy_blocking(&self, plaintext: &str) {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_owned();

        let _ = tokio::task::spawn_blocking(move || hasher.verify_dummy(&plaintext)).await;
    }
}

/// Maps store errors on operations that target the caller's own account.
fn subject_error(err: StoreError) -> AuthError {
    match err {
        StoreError::NotFound { .. } => AuthError::SubjectGone,
        other => other.into(),
    }
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("issuer", &self.issuer)
            .field("hasher", &self.hasher)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
