// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the taskgate binary.
//!
//! Each variant maps to a process exit code so scripts can tell a bad config
//! file from a port that is already taken.

use std::net::SocketAddr;

use taskgate_api::ApiError;
use taskgate_core::{AuthError, StoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for taskgate-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Process exit codes.
pub mod exit_code {
    /// Configuration could not be loaded or is invalid.
    pub const CONFIG: i32 = 1;
    /// The listener could not be bound.
    pub const BIND: i32 = 2;
    /// Seed accounts could not be created.
    pub const SEED: i32 = 3;
    /// The HTTP server failed while running.
    pub const SERVER: i32 = 4;
    /// The session core rejected its configuration or failed.
    pub const AUTH: i32 = 5;
    /// Reading input or writing output failed.
    pub const IO: i32 = 6;
    /// A command failed for any other reason.
    pub const COMMAND: i32 = 7;
}

/// Errors that can occur in the taskgate binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The configuration was loaded but is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// A seed account could not be inserted.
    #[error("Failed to seed account '{username}': {source}")]
    Seed {
        /// Username of the seed entry.
        username: String,
        /// Store failure.
        #[source]
        source: StoreError,
    },

    /// The HTTP server failed.
    #[error("Server error: {0}")]
    Server(#[from] ApiError),

    /// The session core failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Stdin or stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command failed.
    #[error("{0}")]
    Command(String),

    /// An error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a command failure.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Wraps the error with a description of what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Configuration(_) => exit_code::CONFIG,
            Self::Bind { .. } => exit_code::BIND,
            Self::Seed { .. } => exit_code::SEED,
            Self::Server(_) => exit_code::SERVER,
            Self::Auth(_) => exit_code::AUTH,
            Self::Io(_) => exit_code::IO,
            Self::Command(_) => exit_code::COMMAND,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Command(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its causes to stderr.
///
/// `WithContext` and sourced variants already embed their cause in the
/// message, so causes are only listed when they add something new.
pub fn report_error(error: &BinError) {
    let message = error.to_string();
    eprintln!("Error: {}", message);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            eprintln!("  Caused by: {}", cause_message);
        }
        source = cause.source();
    }
}

/// Reports an error and exits with its exit code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefixes_message() {
        let err = BinError::config("no secret").with_context("Loading taskgate.yaml");
        assert_eq!(
            err.to_string(),
            "Loading taskgate.yaml: Configuration error: no secret"
        );
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn test_bind_error() {
        let err = BinError::Bind {
            addr: "127.0.0.1:3000".parse().unwrap(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.to_string(), "Failed to bind 127.0.0.1:3000: address in use");
        assert_eq!(err.exit_code(), exit_code::BIND);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            BinError::from(ConfigError::validation("bad")).exit_code(),
            exit_code::CONFIG
        );
        assert_eq!(
            BinError::Seed {
                username: "admin".into(),
                source: StoreError::unique_violation("username"),
            }
            .exit_code(),
            exit_code::SEED
        );
        assert_eq!(
            BinError::from(ApiError::internal("boom")).exit_code(),
            exit_code::SERVER
        );
        assert_eq!(
            BinError::from(AuthError::internal("x"))
                .with_context("Building server")
                .exit_code(),
            exit_code::AUTH
        );
        assert_eq!(BinError::command("x").exit_code(), exit_code::COMMAND);
    }

    #[test]
    fn test_anyhow_keeps_chain() {
        let err: BinError = anyhow::anyhow!("root").context("outer").into();
        assert_eq!(err.to_string(), "outer: root");
        assert_eq!(err.exit_code(), exit_code::COMMAND);
    }
}
