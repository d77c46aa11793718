//! Per-directory write serialization
//!
//! Mutations of one directory's record are read-modify-write sequences that
//! suspend on storage, so two of them must never interleave. Each directory
//! gets its own async mutex, keyed by its storage key; different directories
//! proceed concurrently.

use crate::key::{derive_key, StorageKey};
use crate::types::DirectoryIdentity;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-directory lock manager.
pub struct DirectoryLocks {
    /// Map from storage key to that directory's lock
    locks: RwLock<HashMap<StorageKey, Arc<Mutex<()>>>>,
}

/// Guard returned by [`DirectoryLocks::lock_pair`]; holds one or two locks.
pub struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl DirectoryLocks {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    fn get_lock(&self, key: &StorageKey) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(key) {
                return lock.clone();
            }
        }

        // Double-check under the write lock; another task may have won.
        let mut map = self.locks.write();
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to `identity`'s record.
    pub async fn lock(&self, identity: &DirectoryIdentity) -> OwnedMutexGuard<()> {
        self.get_lock(&derive_key(identity)).lock_owned().await
    }

    /// Lock two directories, always in key order so concurrent pairs cannot
    /// deadlock. Locks once when both resolve to the same key.
    pub async fn lock_pair(&self, a: &DirectoryIdentity, b: &DirectoryIdentity) -> PairGuard {
        let key_a = derive_key(a);
        let key_b = derive_key(b);
        if key_a == key_b {
            return PairGuard {
                _first: self.get_lock(&key_a).lock_owned().await,
                _second: None,
            };
        }

        let (low, high) = if key_a < key_b {
            (key_a, key_b)
        } else {
            (key_b, key_a)
        };
        let first = self.get_lock(&low).lock_owned().await;
        let second = self.get_lock(&high).lock_owned().await;
        PairGuard {
            _first: first,
            _second: Some(second),
        }
    }

    /// Number of directories that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl Default for DirectoryLocks {
    fn default() -> Self {
        Self::new()
    }
}
