// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account records and the store they live in.
//!
//! The session core never owns account persistence. It talks to an
//! [`AccountStore`], which in production would front a database and in tests
//! is usually [`InMemoryAccountStore`] or a fake.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

// =============================================================================
// Account
// =============================================================================

/// A registered account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Stable account id.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC digest of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account record stamped with the current time.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

// =============================================================================
// AccountStore
// =============================================================================

/// Persistence seam for accounts.
///
/// Implementations must enforce username uniqueness and report a violation as
/// [`StoreError::UniqueViolation`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks up an account by its exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Looks up an account by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Creates an account. Fails if the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError>;

    /// Renames an account. Fails if the new username is taken by another
    /// account.
    async fn update_username(&self, id: Uuid, username: &str) -> Result<Account, StoreError>;

    /// Replaces the password digest of an account.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Account, StoreError>;

    /// Deletes an account.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

// =============================================================================
// InMemoryAccountStore
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    by_id: HashMap<Uuid, Account>,
    by_username: HashMap<String, Uuid>,
}

/// Account store backed by process memory.
///
/// Both indexes sit behind one lock so the uniqueness check and the insert
/// happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    tables: RwLock<Tables>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of accounts.
    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    /// Returns `true` if there are no accounts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.read().by_id.get(&id).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError> {
        let mut tables = self.tables.write();

        if tables.by_username.contains_key(username) {
            return Err(StoreError::unique_violation("username"));
        }

        let account = Account::new(username, password_hash);
        tables.by_username.insert(account.username.clone(), account.id);
        tables.by_id.insert(account.id, account.clone());

        Ok(account)
    }

    async fn update_username(&self, id: Uuid, username: &str) -> Result<Account, StoreError> {
        let mut tables = self.tables.write();
        let tables = &mut *tables;

        match tables.by_username.get(username) {
            Some(owner) if *owner != id => return Err(StoreError::unique_violation("username")),
            _ => {}
        }

        let account = tables
            .by_id
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;

        tables.by_username.remove(&account.username);
        tables.by_username.insert(username.to_string(), id);
        account.username = username.to_string();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Account, StoreError> {
        let mut tables = self.tables.write();

        let account = tables
            .by_id
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write();

        let account = tables
            .by_id
            .remove(&id)
            .ok_or(StoreError::NotFound { id })?;
        tables.by_username.remove(&account.username);

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
