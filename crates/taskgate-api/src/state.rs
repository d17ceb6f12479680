// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use taskgate_core::{
    AccessGate, AccountStore, CredentialHasher, InMemoryAccountStore, RevocationStore,
    SessionOrchestrator, TokenIssuer,
};

use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Session operations.
    pub sessions: Arc<SessionOrchestrator>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the session orchestrator.
    pub fn sessions(&self) -> &SessionOrchestrator {
        &self.sessions
    }

    /// Returns the access gate.
    pub fn gate(&self) -> &AccessGate {
        self.sessions.access_gate()
    }

    /// Returns the revocation store.
    pub fn revocations(&self) -> &Arc<RevocationStore> {
        self.sessions.revocations()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    account_store: Option<Arc<dyn AccountStore>>,
    revocations: Option<Arc<RevocationStore>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the account store. Defaults to an empty in-memory store.
    pub fn account_store(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.account_store = Some(store);
        self
    }

    /// Sets the revocation store. Defaults to a fresh store.
    pub fn revocations(mut self, store: Arc<RevocationStore>) -> Self {
        self.revocations = Some(store);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the JWT, session or hashing configuration is invalid.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        config.session.validate()?;
        let issuer = TokenIssuer::new(config.jwt.clone())?;
        let hasher = CredentialHasher::new(&config.hashing).map_err(taskgate_core::AuthError::from)?;

        let accounts = self
            .account_store
            .unwrap_or_else(|| Arc::new(InMemoryAccountStore::new()));
        let revocations = self
            .revocations
            .unwrap_or_else(|| Arc::new(RevocationStore::new()));

        let sessions = SessionOrchestrator::new(
            accounts,
            hasher,
            issuer,
            revocations,
            config.session.clone(),
        );

        Ok(AppState {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
