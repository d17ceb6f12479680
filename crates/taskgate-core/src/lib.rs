// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-core
//!
//! Session and access-control core for the taskgate task backend.
//!
//! This crate owns everything that decides whether a caller is who they say
//! they are:
//!
//! - [`hasher`]: Argon2id password hashing and verification
//! - [`token`]: bearer token issuing and verification (HS256 JWT)
//! - [`revocation`]: in-process store of tokens rejected before expiry
//! - [`gate`]: per-request enforcement of a bearer token
//! - [`session`]: login, signup, logout, token validation and account upkeep
//! - [`account`]: the record store seam the core delegates account lookups to
//!
//! ## Flow
//!
//! ```text
//! credentials ──► SessionOrchestrator ──► CredentialHasher::verify
//!                        │
//!                        └──► TokenIssuer::issue ──► access token
//!
//! Authorization: Bearer <token> ──► AccessGate
//!                                     ├─► TokenIssuer::verify
//!                                     ├─► RevocationStore::is_revoked
//!                                     └─► AccountStore::find_by_id
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod account;
pub mod error;
pub mod gate;
pub mod hasher;
pub mod revocation;
pub mod session;
pub mod token;

pub use account::{Account, AccountStore, InMemoryAccountStore};
pub use error::{AuthError, AuthResult, HashError, StoreError, TokenError};
pub use gate::{AccessDecision, AccessGate, DenyReason, Identity, parse_bearer};
pub use hasher::{CredentialHasher, HashingConfig};
pub use revocation::RevocationStore;
pub use session::{IssuedToken, SessionConfig, SessionOrchestrator};
pub use token::{Claims, JwtConfig, TokenIssuer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
