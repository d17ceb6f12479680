// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with a single process-wide secret. They are
//! never persisted; a token is valid exactly when its signature verifies, its
//! `exp` has not passed and the [`RevocationStore`](crate::RevocationStore)
//! does not hold it.

mod claims;
mod issuer;

pub use claims::Claims;
pub use issuer::{JwtConfig, MAX_EXPIRATION_SECS, MAX_LEEWAY_SECS, TokenIssuer};
