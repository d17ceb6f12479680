// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! - Account store creation and seeding
//! - API server construction
//! - Revocation sweeper lifecycle
//! - Graceful shutdown coordination

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskgate_api::{ApiServer, ApiServerBuilder};
use taskgate_core::{AccountStore, InMemoryAccountStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::TaskgateConfig;
use crate::error::{BinError, BinResult};
use crate::loader::load_config;
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServerRuntime
// =============================================================================

/// Owns the configuration and drives the server until shutdown.
pub struct ServerRuntime {
    config: Arc<TaskgateConfig>,
    shutdown: ShutdownCoordinator,
    seed_accounts: bool,
}

impl ServerRuntime {
    /// Creates a new runtime.
    pub fn new(config: TaskgateConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            seed_accounts: true,
        }
    }

    /// Enables or disables loading seed accounts.
    pub fn with_seed_accounts(mut self, enabled: bool) -> Self {
        self.seed_accounts = enabled;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TaskgateConfig {
        &self.config
    }

    /// Returns a handle that can trigger shutdown.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Builds the API server with a seeded account store.
    pub async fn build_server(&self) -> BinResult<ApiServer> {
        let store = Arc::new(InMemoryAccountStore::new());

        if self.seed_accounts {
            for seed in &self.config.seed_accounts {
                store
                    .create(&seed.username, &seed.password_hash)
                    .await
                    .map_err(|source| BinError::Seed {
                        username: seed.username.clone(),
                        source,
                    })?;
            }
            if !self.config.seed_accounts.is_empty() {
                info!(count = store.len(), "Seeded accounts");
            }
        }

        let server = ApiServerBuilder::new()
            .config(self.config.api.clone())
            .account_store(store)
            .build()?;

        Ok(server)
    }

    /// Binds the configured address and runs until shutdown.
    pub async fn run(self) -> BinResult<()> {
        let addr = self.config.api.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BinError::Bind { addr, source })?;

        self.run_with_listener(listener).await
    }

    /// Runs on an already bound listener until shutdown.
    pub async fn run_with_listener(self, listener: TcpListener) -> BinResult<()> {
        info!("Starting taskgate v{}", taskgate_core::VERSION);

        let server = self.build_server().await?;

        let sweeper = server.state().revocations().spawn_sweeper(
            self.config.api.session.sweep_interval(),
            self.shutdown.shutdown_signal(),
        );

        let signals = {
            let coordinator = self.shutdown.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        let result = server
            .serve(listener, self.shutdown.shutdown_signal())
            .await
            .map_err(BinError::from);

        // The server may have stopped on its own; make sure everything else follows.
        self.shutdown.initiate_shutdown();
        signals.abort();

        if tokio::time::timeout(self.config.api.shutdown_timeout, sweeper)
            .await
            .is_err()
        {
            warn!("Revocation sweeper did not stop within the shutdown timeout");
        }

        info!("taskgate shutdown complete");
        result
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<TaskgateConfig>,
    port: Option<u16>,
    skip_seed: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: TaskgateConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Skips seeding accounts.
    pub fn skip_seed(mut self, skip: bool) -> Self {
        self.skip_seed = skip;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServerRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Loading {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.api.port = port;
        }

        Ok(ServerRuntime::new(config).with_seed_accounts(!self.skip_seed))
    }
}

// =============================================================================
// Tests
// =============================================================================
