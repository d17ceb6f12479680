// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! An account store that delegates to memory but can be told to fail, and
//! counts the calls it receives.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use taskgate_core::{Account, AccountStore, InMemoryAccountStore, StoreError};
use uuid::Uuid;

// =============================================================================
// MockAccountStore
// =============================================================================

/// Account store with error injection.
#[derive(Debug, Default)]
pub struct MockAccountStore {
    inner: InMemoryAccountStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

impl MockAccountStore {
    /// Creates a working store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every lookup fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every mutation fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of lookups received.
    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Number of mutations received.
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<(), StoreError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        Ok(())
    }

    fn write(&self) -> Result<(), StoreError> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MockAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.read()?;
        self.inner.find_by_username(username).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        self.read()?;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError> {
        self.write()?;
        self.inner.create(username, password_hash).await
    }

    async fn update_username(&self, id: Uuid, username: &str) -> Result<Account, StoreError> {
        self.write()?;
        self.inner.update_username(id, username).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Account, StoreError> {
        self.write()?;
        self.inner.update_password(id, password_hash).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?;
        self.inner.delete(id).await
    }
}
