//! Per-token serialization of cart writes.
//!
//! A load-merge-save for one token runs while holding that token's mutex, so
//! two concurrent additions to the same cart cannot overwrite each other.
//! Writes to different carts never wait on each other.

use dashmap::DashMap;
use std::{future::Future, sync::Arc};
use tokio::sync::Mutex;

use super::models::Token;

#[derive(Debug, Clone, Default)]
pub struct CartLocks {
    locks: Arc<DashMap<Token, Arc<Mutex<()>>>>,
}

impl CartLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` while holding the lock for `token`.
    ///
    /// The entry is dropped from the registry again once nobody else holds or
    /// waits for it, including when this future is dropped before `op` ends.
    pub async fn with_lock<T, F, Fut>(&self, token: &Token, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let entry = LockEntry {
            locks: self,
            token,
            lock: self.lock_for(token),
        };
        let _guard = entry.lock.lock().await;
        op().await
    }

    /// Number of tokens with a live lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn lock_for(&self, token: &Token) -> Arc<Mutex<()>> {
        let entry = self
            .locks
            .entry(token.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }
}

/// One caller's hold on a registry entry.
///
/// Removes the entry on drop when the registry and this hold are its only
/// owners. The mutex guard borrows `lock`, so it is always released first.
struct LockEntry<'a> {
    locks: &'a CartLocks,
    token: &'a Token,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        self.locks.locks.remove_if(self.token, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}
