// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the session core.
//!
//! # Error Hierarchy
//!
//! ```text
//! AuthError (root)
//! ├── TokenError  - bearer token could not be verified
//! ├── HashError   - password digest could not be produced or parsed
//! └── StoreError  - the account record store failed
//! ```
//!
//! Every variant except the internal ones is an expected outcome of a bad
//! request and is mapped to a 4xx response at the HTTP edge. A malformed
//! stored digest is the one condition treated as data corruption.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for session core operations.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// AuthError - Root Error Type
// =============================================================================

/// The root error type for authentication and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header was presented.
    #[error("Authorization header not found")]
    MissingHeader,

    /// The `Authorization` header is not of the form `Bearer <token>`.
    #[error("Invalid authorization header format")]
    MalformedHeader,

    /// The token could not be parsed or its signature did not verify.
    #[error("Malformed token")]
    MalformedToken,

    /// The token's embedded expiry has passed.
    #[error("Token has expired")]
    ExpiredToken,

    /// The token was explicitly revoked (logout).
    #[error("Token has been revoked")]
    RevokedToken,

    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("Username or password invalid")]
    InvalidCredentials,

    /// The confirmation password supplied by an authenticated caller is wrong.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Signup attempted with a username that already exists.
    #[error("Username already registered")]
    UsernameTaken,

    /// The token is valid but its subject no longer exists.
    #[error("User not found or inactive")]
    SubjectGone,

    /// Token validation failed for any reason.
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    /// Invalid configuration supplied to a core component.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Password hashing failure.
    #[error("Hashing error: {0}")]
    Hashing(#[from] HashError),

    /// Record store failure.
    #[error("Record store error: {0}")]
    Store(StoreError),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns `true` if this error signals a server-side fault rather than a
    /// bad request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Hashing(_) | Self::Store(_) | Self::Internal(_)
        )
    }

    /// Returns `true` if this error rejects a presented bearer token.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingHeader
                | Self::MalformedHeader
                | Self::MalformedToken
                | Self::ExpiredToken
                | Self::RevokedToken
                | Self::SubjectGone
                | Self::InvalidOrExpired
        )
    }

    /// Returns a stable code for categorization.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::MalformedToken => "malformed_token",
            Self::ExpiredToken => "expired_token",
            Self::RevokedToken => "revoked_token",
            Self::InvalidCredentials => "invalid_credentials",
            Self::IncorrectPassword => "incorrect_password",
            Self::UsernameTaken => "username_taken",
            Self::SubjectGone => "subject_gone",
            Self::InvalidOrExpired => "invalid_or_expired",
            Self::Configuration(_) => "configuration",
            Self::Hashing(_) => "hashing",
            Self::Store(_) => "store",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Malformed(_) => Self::MalformedToken,
            TokenError::Signing(message) => Self::Internal(message),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => Self::UsernameTaken,
            other => Self::Store(other),
        }
    }
}

// =============================================================================
// TokenError
// =============================================================================

/// Errors raised while issuing or verifying a bearer token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token cannot be parsed or its integrity tag does not match.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token's `exp` claim is in the past.
    #[error("token has expired")]
    Expired,

    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Returns `true` if the token is well-formed but past its expiry.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

// =============================================================================
// HashError
// =============================================================================

/// Errors raised by the credential hasher.
#[derive(Debug, Clone, Error)]
pub enum HashError {
    /// The work factor parameters are out of range.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// A stored digest could not be parsed. Indicates data corruption.
    #[error("malformed password digest: {0}")]
    MalformedDigest(String),

    /// Computing the digest failed.
    #[error("failed to hash password: {0}")]
    Hash(String),
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors reported by an [`AccountStore`](crate::AccountStore) implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("unique constraint violated on '{field}'")]
    UniqueViolation {
        /// The constrained field.
        field: String,
    },

    /// The referenced account does not exist.
    #[error("account not found: {id}")]
    NotFound {
        /// The account id.
        id: Uuid,
    },

    /// The backing store failed.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a uniqueness violation error.
    pub fn unique_violation(field: impl Into<String>) -> Self {
        Self::UniqueViolation {
            field: field.into(),
        }
    }

    /// Creates a backend failure error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
