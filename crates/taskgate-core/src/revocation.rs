// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process store of revoked tokens.
//!
//! A token lands here on logout and stays until its deadline passes. Lapsed
//! entries are dropped lazily on lookup and eagerly by a periodic sweep, so
//! the map only ever holds tokens that would otherwise still be accepted.
//!
//! The store is process-local. Every replica of the service keeps its own.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Upper bound on how long a single entry is kept.
const MAX_RETENTION: Duration = Duration::from_secs(10 * 366 * 24 * 60 * 60);

/// Concurrent map from token string to the instant it stops being revoked.
#[derive(Debug, Default)]
pub struct RevocationStore {
    entries: DashMap<String, Instant>,
}

impl RevocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `token` as revoked for `ttl` from now.
    ///
    /// Revoking an already revoked token keeps whichever deadline is later.
    /// `ttl` is clamped to ten years.
    pub fn revoke(&self, token: &str, ttl: Duration) {
        let now = Instant::now();
        let mut ttl = ttl.min(MAX_RETENTION);
        // Halve until the deadline is representable; zero always is.
        let deadline = loop {
            match now.checked_add(ttl) {
                Some(deadline) => break deadline,
                None => ttl /= 2,
            }
        };

        self.entries
            .entry(token.to_string())
            .and_modify(|current| {
                if deadline > *current {
                    *current = deadline;
                }
            })
            .or_insert(deadline);

        trace!(ttl_secs = ttl.as_secs(), "Token revoked");
    }

    /// Returns `true` if `token` is currently revoked.
    ///
    /// A lapsed entry is removed and reported as not revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        let now = Instant::now();

        // Copy out before touching the map again; holding the shard guard
        // across `remove_if` would deadlock.
        let deadline = match self.entries.get(token) {
            Some(entry) => *entry.value(),
            None => return false,
        };

        if deadline > now {
            return true;
        }

        // Another caller may have extended the deadline in between.
        self.entries.remove_if(token, |_, current| *current <= now);
        false
    }

    /// Removes every lapsed entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();

        self.entries.retain(|_, deadline| *deadline > now);

        before.saturating_sub(self.entries.len())
    }

    /// Spawns a task that purges lapsed entries every `interval` until
    /// `shutdown` resolves.
    pub fn spawn_sweeper<F>(self: &Arc<Self>, interval: Duration, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let store = Arc::clone(self);
        let period = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        debug!("Revocation sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = store.purge_expired();
                        if purged > 0 {
                            debug!(purged, remaining = store.len(), "Purged lapsed revocations");
                        }
                    }
                }
            }
        })
    }

    /// Returns the number of entries, lapsed or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
