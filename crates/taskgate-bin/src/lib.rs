// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-bin
//!
//! CLI binary for the taskgate task backend.
//!
//! This crate provides:
//!
//! - CLI argument parsing with clap
//! - Configuration file loading with environment overrides
//! - Server runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//! - Command implementations (run, validate, version, hash-password)
//!
//! ## Architecture
//!
//! ```text
//!                       main.rs
//!                          │
//!                       cli.rs
//!                          │
//!            ┌─────────────┼─────────────┐
//!            ▼             ▼             ▼
//!        commands       runtime       logging
//!            │             │
//!         loader       shutdown
//!            │             │
//!            └──── taskgate-api / taskgate-core
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! taskgate
//!
//! # Start with a custom config
//! taskgate -c /etc/taskgate/config.yaml
//!
//! # Validate configuration
//! taskgate validate --strict
//!
//! # Produce a digest for a seed account
//! taskgate hash-password 'Str0ng!Pass1'
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use config::{ConfigError, ConfigResult, SeedAccount, TaskgateConfig};
pub use error::{BinError, BinResult};
pub use loader::{ConfigFormat, ConfigLoader, load_config};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServerRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
