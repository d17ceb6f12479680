// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::{BufRead, Read};

use anyhow::Context;
use taskgate_api::error::ValidationErrors;
use taskgate_api::validation::check_password;
use taskgate_core::{CredentialHasher, HashingConfig};
use tracing::warn;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::BinResult;
use crate::loader::ConfigLoader;

/// Prints an Argon2id digest suitable for `seed_accounts[].password_hash`.
pub fn hash_password(cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match (&args.password, args.stdin) {
        (Some(password), false) => password.clone(),
        _ => read_password(std::io::stdin().lock())?,
    };

    let hashing = if args.from_config {
        ConfigLoader::new()
            .with_validation(false)
            .load(&cli.config)?
            .api
            .hashing
    } else {
        HashingConfig::default()
    };

    println!("{}", digest(&password, &hashing)?);
    Ok(())
}

/// Reads the first line of `reader` without its line terminator.
fn read_password(reader: impl Read) -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::BufReader::new(reader)
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "Password must not be empty");
    Ok(password)
}

/// Hashes `password`, warning when it would be rejected at signup.
fn digest(password: &str, hashing: &HashingConfig) -> BinResult<String> {
    let mut errors = ValidationErrors::new();
    check_password("password", password, &mut errors);
    if !errors.is_empty() {
        warn!("Password does not meet the signup rules: {}", errors);
    }

    let hasher = CredentialHasher::new(hashing).map_err(taskgate_core::AuthError::from)?;
    let digest = hasher.hash(password).map_err(taskgate_core::AuthError::from)?;
    Ok(digest)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_strips_newline() {
        let password = read_password("Str0ng!Pass1\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(password, "Str0ng!Pass1");
    }

    #[test]
    fn test_read_password_rejects_empty() {
        assert!(read_password("\n".as_bytes()).is_err());
        assert!(read_password("".as_bytes()).is_err());
    }

    #[test]
    fn test_digest_verifies() {
        let hashing = HashingConfig::fast();
        let digest = digest("Str0ng!Pass1", &hashing).unwrap();

        assert!(digest.starts_with("$argon2id$"));
        let hasher = CredentialHasher::new(&hashing).unwrap();
        assert!(hasher.verify("Str0ng!Pass1", &digest).unwrap());
    }
}
