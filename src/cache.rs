//! Metadata Cache
//!
//! In-memory map from directory identity to its order record (or its
//! absence). Entries load lazily through the [`MetadataStore`], absent
//! outcomes included, and every write goes to the store before the cache is
//! touched: if the store fails, the cache keeps its previous value.
//!
//! A load that overlaps any write is returned to its caller but never
//! cached, so it cannot shadow the newer value.
//!
//! Entries are kept in insertion order; with a bounded capacity the oldest
//! entry is evicted first and simply reloads on next access.

use crate::error::OrderError;
use crate::store::MetadataStore;
use crate::types::{DirectoryIdentity, OrderRecord};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: Option<OrderRecord>,
    /// False once invalidated; the next `get` reloads from the store.
    fresh: bool,
}

/// Cache counters.
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct MetadataCache {
    store: MetadataStore,
    entries: Mutex<IndexMap<DirectoryIdentity, CacheEntry>>,
    /// Maximum number of entries; 0 means unbounded.
    capacity: usize,
    counters: CacheCounters,
    /// Bumped under the entries lock by every write to the cache.
    generation: AtomicU64,
}

impl MetadataCache {
    pub fn new(store: MetadataStore, capacity: usize) -> Self {
        Self {
            store,
            entries: Mutex::new(IndexMap::new()),
            capacity,
            counters: CacheCounters::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Record for `identity`, loading it from the store on a miss.
    pub async fn get(&self, identity: &DirectoryIdentity) -> Result<Option<OrderRecord>, OrderError> {
        let generation = {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(identity).filter(|e| e.fresh) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.record.clone());
            }
            self.generation.load(Ordering::Acquire)
        };

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let record = self.store.load(identity).await?;

        let mut entries = self.entries.lock();
        if self.generation.load(Ordering::Acquire) == generation {
            self.insert_locked(&mut entries, identity, record.clone());
        } else {
            debug!(directory = %identity, "Discarded load that raced a cache write");
        }
        Ok(record)
    }

    /// Persist `record` for `identity`, then cache it.
    ///
    /// An empty record deletes the file instead: empty directories never
    /// carry a record.
    pub async fn set(&self, identity: &DirectoryIdentity, record: OrderRecord) -> Result<(), OrderError> {
        if record.is_empty() {
            return self.clear(identity).await;
        }
        self.store.save(identity, &record).await?;
        self.insert(identity, Some(record));
        Ok(())
    }

    /// Delete the record for `identity` and cache its absence.
    pub async fn clear(&self, identity: &DirectoryIdentity) -> Result<(), OrderError> {
        self.store.delete(identity).await?;
        self.insert(identity, None);
        Ok(())
    }

    /// Mark the entry stale so the next `get` reloads it.
    pub fn invalidate(&self, identity: &DirectoryIdentity) {
        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(entry) = entries.get_mut(identity) {
            entry.fresh = false;
        }
    }

    /// Drop a deleted directory: its record file and its cache entry.
    pub async fn remove(&self, identity: &DirectoryIdentity) -> Result<(), OrderError> {
        self.store.delete(identity).await?;
        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.shift_remove(identity);
        Ok(())
    }

    /// Relocate the record of `from` to `to` and update the cache to match.
    pub async fn relocate(
        &self,
        from: &DirectoryIdentity,
        to: &DirectoryIdentity,
        is_move: bool,
    ) -> Result<bool, OrderError> {
        let relocated = self.store.relocate(from, to, is_move).await?;

        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        let source = entries.get(from).filter(|e| e.fresh).map(|e| e.record.clone());
        entries.shift_remove(to);
        if is_move {
            entries.shift_remove(from);
        }

        // A fresh source entry tells us exactly what now sits at `to`.
        match source {
            Some(Some(record)) if relocated => self.insert_locked(&mut entries, to, Some(record)),
            Some(None) if !relocated && is_move => self.insert_locked(&mut entries, to, None),
            _ => {}
        }
        Ok(relocated)
    }

    /// Cached value without touching the store: `None` on a miss.
    pub fn peek(&self, identity: &DirectoryIdentity) -> Option<Option<OrderRecord>> {
        self.entries
            .lock()
            .get(identity)
            .filter(|e| e.fresh)
            .map(|e| e.record.clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }

    fn insert(&self, identity: &DirectoryIdentity, record: Option<OrderRecord>) {
        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.insert_locked(&mut entries, identity, record);
    }

    fn insert_locked(
        &self,
        entries: &mut IndexMap<DirectoryIdentity, CacheEntry>,
        identity: &DirectoryIdentity,
        record: Option<OrderRecord>,
    ) {
        if self.capacity > 0 && !entries.contains_key(identity) {
            while entries.len() >= self.capacity {
                if let Some((evicted, _)) = entries.shift_remove_index(0) {
                    debug!(directory = %evicted, "Evicted cache entry");
                    self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                } else {
                    break;
                }
            }
        }
        entries.insert(
            identity.clone(),
            CacheEntry {
                record,
                fresh: true,
            },
        );
    }
}
