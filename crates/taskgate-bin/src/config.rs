// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Top-level configuration schema.
//!
//! ```yaml
//! api:
//!   host: 0.0.0.0
//!   port: 3000
//!   jwt:
//!     secret: ${TASKGATE_JWT_SECRET}
//!     expiration_secs: 3600
//!   session:
//!     revocation_ttl_secs: 3600
//! seed_accounts:
//!   - username: admin
//!     password_hash: $argon2id$v=19$...
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taskgate_api::ApiConfig;
use taskgate_api::error::ValidationErrors;
use taskgate_api::validation::check_username;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// TaskgateConfig
// =============================================================================

/// Root configuration loaded by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskgateConfig {
    /// HTTP server and session settings.
    pub api: ApiConfig,
    /// Accounts inserted into the in-memory store at startup.
    pub seed_accounts: Vec<SeedAccount>,
}

/// An account created at startup from a precomputed digest.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedAccount {
    /// Login name.
    pub username: String,
    /// Argon2 PHC digest, as printed by `taskgate hash-password`.
    pub password_hash: String,
}

impl std::fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAccount")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl TaskgateConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api
            .validate()
            .map_err(|e| ConfigError::validation(e.to_string()))?;

        let mut seen = HashSet::new();
        for (i, seed) in self.seed_accounts.iter().enumerate() {
            let mut errors = ValidationErrors::new();
            check_username(&format!("seed_accounts[{}].username", i), &seed.username, &mut errors);
            if !errors.is_empty() {
                return Err(ConfigError::validation(errors.to_string()));
            }
            if !seen.insert(seed.username.as_str()) {
                return Err(ConfigError::validation(format!(
                    "seed_accounts[{}].username '{}' is duplicated",
                    i, seed.username
                )));
            }
            if !seed.password_hash.starts_with("$argon2") {
                return Err(ConfigError::validation(format!(
                    "seed_accounts[{}].password_hash is not an Argon2 PHC string",
                    i
                )));
            }
        }

        Ok(())
    }

    /// Returns non-fatal findings worth reporting.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.api.jwt.secret.len() < 32 {
            warnings.push("JWT secret is shorter than 32 bytes".to_string());
        }
        if self.api.cors.allows_any_origin() {
            warnings.push("CORS allows any origin".to_string());
        }
        if self.api.session.revocation_ttl_secs < self.api.jwt.expiration_secs {
            warnings.push(format!(
                "session.revocation_ttl_secs ({}) is below jwt.expiration_secs ({}); \
                 revocations still last until each token expires",
                self.api.session.revocation_ttl_secs, self.api.jwt.expiration_secs
            ));
        }

        warnings
    }
}

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file could not be read.
    #[error("Failed to read {}: {message}", path.display())]
    Io {
        /// The file path.
        path: PathBuf,
        /// The I/O error message.
        message: String,
    },

    /// The file content could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The parser message.
        message: String,
    },

    /// Content could not be deserialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// The parser message.
        message: String,
    },

    /// The file extension is not a supported format.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// An override variable held an unusable value.
    #[error("Invalid environment variable {name}: {message}")]
    InvalidEnvVar {
        /// The variable name.
        name: String,
        /// What was expected.
        message: String,
    },

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: &Path) -> Self {
        Self::FileNotFound {
            path: path.to_path_buf(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Creates a parse error.
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(ext: impl Into<String>) -> Self {
        Self::UnsupportedFormat(ext.into())
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
