// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing with Argon2id.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the parameters a digest was produced with travel with it and verification
//! keeps working after the configured work factor changes.
//!
//! Hashing is deliberately slow. Callers on an async runtime must run it on the
//! blocking pool (see [`SessionOrchestrator`](crate::SessionOrchestrator)).

use std::sync::{Arc, OnceLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::HashError;

// =============================================================================
// HashingConfig
// =============================================================================

/// Argon2 work factor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Minimal work factor. Only for tests and tooling.
    pub fn fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(8),
            iterations: Params::MIN_T_COST,
            parallelism: 1,
        }
    }

    fn params(&self) -> Result<Params, HashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))
    }
}

// =============================================================================
// CredentialHasher
// =============================================================================

/// One-way password hasher.
///
/// Cheap to clone and safe to call from any thread.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    dummy_digest: Arc<OnceLock<String>>,
}

impl CredentialHasher {
    /// Creates a hasher with the given work factor.
    pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
        Ok(Self {
            params: config.params()?,
            dummy_digest: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Hash(e.to_string()))
    }

    /// Verifies `plaintext` against a stored digest.
    ///
    /// A wrong password yields `Ok(false)`. An unparseable digest is an error.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let parsed =
            PasswordHash::new(digest).map_err(|e| HashError::MalformedDigest(e.to_string()))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::MalformedDigest(e.to_string())),
        }
    }

    /// Runs a full verification against a throwaway digest and discards the
    /// result.
    ///
    /// Used when a login names an unknown account so that the response takes
    /// as long as a wrong-password response.
    pub fn verify_dummy(&self, plaintext: &str) {
        let digest = match self.dummy_digest.get() {
            Some(digest) => digest,
            None => match self.hash("taskgate-dummy-credential") {
                Ok(digest) => self.dummy_digest.get_or_init(|| digest),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to prepare dummy digest");
                    return;
                }
            },
        };

        let _ = self.verify(plaintext, digest);
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
