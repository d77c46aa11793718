//! Order Engine
//!
//! The surface the tree and UI layers talk to. Reads reconcile the recorded
//! order against the live listing; mutations run against that reconciled
//! order, are serialized per directory and persist at most once per call.
//! Relocation keeps records attached to directories that move or are copied.

use crate::cache::{CacheStats, MetadataCache};
use crate::compare::Comparator;
use crate::concurrency::DirectoryLocks;
use crate::config::OrderConfig;
use crate::error::{OrderError, StorageError};
use crate::events::{split_child, ChangeEvent};
use crate::mutation::{self, OrderChange};
use crate::reconcile::{reconcile, OrderReconciler};
use crate::storage::StorageProvider;
use crate::store::MetadataStore;
use crate::types::{ChildEntry, DirectoryIdentity, OrderRecord};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Settings needed to build an [`OrderEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directory holding the record buckets.
    pub metadata_root: PathBuf,
    pub comparator: Comparator,
    /// Cached directories; 0 means unbounded.
    pub cache_capacity: usize,
}

impl EngineOptions {
    pub fn new(metadata_root: impl Into<PathBuf>) -> Self {
        Self {
            metadata_root: metadata_root.into(),
            comparator: Comparator::default(),
            cache_capacity: 0,
        }
    }

    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Options described by a loaded configuration for `workspace_root`.
    pub fn from_config(config: &OrderConfig, workspace_root: &Path) -> Result<Self, OrderError> {
        Ok(Self {
            metadata_root: config.storage.resolve_metadata_root(workspace_root)?,
            comparator: config.comparator(),
            cache_capacity: config.cache.capacity,
        })
    }
}

pub struct OrderEngine {
    storage: Arc<dyn StorageProvider>,
    cache: Arc<MetadataCache>,
    reconciler: OrderReconciler,
    locks: DirectoryLocks,
}

impl OrderEngine {
    pub fn new(storage: Arc<dyn StorageProvider>, options: EngineOptions) -> Self {
        let store = MetadataStore::new(storage.clone(), options.metadata_root);
        let cache = Arc::new(MetadataCache::new(store, options.cache_capacity));
        let reconciler = OrderReconciler::new(cache.clone(), options.comparator);
        Self {
            storage,
            cache,
            reconciler,
            locks: DirectoryLocks::new(),
        }
    }

    pub fn comparator(&self) -> &Comparator {
        self.reconciler.comparator()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Location of the record file for `dir`, whether or not it exists.
    pub fn record_path(&self, dir: &DirectoryIdentity) -> PathBuf {
        self.cache.store().record_path(dir)
    }

    /// The recorded order of `dir` as last persisted, without reconciling.
    pub async fn record(&self, dir: &DirectoryIdentity) -> Result<Option<OrderRecord>, OrderError> {
        let _guard = self.locks.lock(dir).await;
        self.cache.get(dir).await
    }

    /// Immediate children of `dir` as reported by the storage collaborator.
    pub async fn list_children(&self, dir: &DirectoryIdentity) -> Result<Vec<ChildEntry>, OrderError> {
        let stat = self.storage.stat(dir.path()).await?;
        if !stat.is_directory() {
            return Err(StorageError::NotADirectory(dir.path().to_path_buf()).into());
        }
        Ok(stat.children.unwrap_or_default())
    }

    /// Effective order of `dir` given its live children.
    ///
    /// Drift between the record and `live` is repaired and written back;
    /// a directory without a record gets the comparator's order and no file.
    pub async fn get_effective_order(
        &self,
        dir: &DirectoryIdentity,
        live: &[ChildEntry],
    ) -> Result<Vec<String>, OrderError> {
        let _guard = self.locks.lock(dir).await;
        self.reconciler.sync_with_disk(dir, live).await
    }

    /// [`get_effective_order`](Self::get_effective_order) with the children
    /// listed through the storage collaborator.
    pub async fn effective_order(&self, dir: &DirectoryIdentity) -> Result<Vec<String>, OrderError> {
        let live = self.list_children(dir).await?;
        self.get_effective_order(dir, &live).await
    }

    /// Apply one change to `dir` and return the resulting order.
    pub async fn apply_change(
        &self,
        dir: &DirectoryIdentity,
        change: OrderChange,
    ) -> Result<Vec<String>, OrderError> {
        self.apply_batch(dir, std::slice::from_ref(&change)).await
    }

    /// Apply `changes` in sequence as one transaction.
    ///
    /// The changes run against the reconciled order in memory; the outcome is
    /// persisted with a single write, or not at all if any change is rejected.
    /// If the write fails the cached record keeps its previous value and the
    /// storage error is returned.
    pub async fn apply_batch(
        &self,
        dir: &DirectoryIdentity,
        changes: &[OrderChange],
    ) -> Result<Vec<String>, OrderError> {
        let _guard = self.locks.lock(dir).await;
        let live = self.list_children(dir).await?;
        let comparator = self.reconciler.comparator();

        let recorded = self.cache.get(dir).await?;
        let base = match &recorded {
            Some(record) => reconcile(record, &live, comparator).order,
            None => comparator.sorted_names(&live),
        };
        let order = mutation::apply_all(&base, changes)?;

        let persist = match &recorded {
            Some(record) => order.as_slice() != record.names(),
            None => order != base && !changes.iter().all(OrderChange::preserves_default_order),
        };
        if !persist {
            debug!(
                directory = %dir,
                changes = changes.len(),
                "Order unchanged; nothing to persist"
            );
            return Ok(order);
        }

        self.cache.set(dir, OrderRecord::new(order.clone())).await?;
        info!(
            directory = %dir,
            changes = changes.len(),
            lots = changes.iter().filter(|c| c.is_lot()).count(),
            entries = order.len(),
            "Persisted order"
        );
        Ok(order)
    }

    /// Move (`is_move`) or copy the record of `from` to `to`.
    ///
    /// Only the record of that one directory is touched; see
    /// [`relocate_tree`](Self::relocate_tree) for whole subtrees.
    pub async fn relocate_directory(
        &self,
        from: &DirectoryIdentity,
        to: &DirectoryIdentity,
        is_move: bool,
    ) -> Result<bool, OrderError> {
        let _guard = self.locks.lock_pair(from, to).await;
        self.cache.relocate(from, to, is_move).await
    }

    /// Relocate the records of every directory in the tree now at `to`.
    ///
    /// Each directory `to/rel` takes the record of `from/rel`. Levels are
    /// walked breadth-first; directories on one level relocate concurrently.
    /// Returns the number of records relocated.
    pub async fn relocate_tree(
        &self,
        from: &DirectoryIdentity,
        to: &DirectoryIdentity,
        is_move: bool,
    ) -> Result<usize, OrderError> {
        match self.storage.stat(to.path()).await {
            Ok(stat) if stat.is_directory() => {}
            Ok(_) => return Ok(0),
            Err(e) => return Err(e.into()),
        }

        let mut level = vec![PathBuf::new()];
        let mut relocated = 0;
        while !level.is_empty() {
            let results =
                try_join_all(level.iter().map(|rel| self.relocate_level(from, to, rel, is_move))).await?;
            level = Vec::new();
            for (moved, subdirs) in results {
                relocated += usize::from(moved);
                level.extend(subdirs);
            }
        }

        info!(from = %from, to = %to, is_move, relocated, "Relocated directory tree");
        Ok(relocated)
    }

    async fn relocate_level(
        &self,
        from: &DirectoryIdentity,
        to: &DirectoryIdentity,
        rel: &Path,
        is_move: bool,
    ) -> Result<(bool, Vec<PathBuf>), OrderError> {
        let source = descend(from, rel);
        let target = descend(to, rel);
        let moved = self.relocate_directory(&source, &target, is_move).await?;
        let subdirs = self
            .list_children(&target)
            .await?
            .into_iter()
            .filter(ChildEntry::is_directory)
            .map(|child| rel.join(child.name))
            .collect();
        Ok((moved, subdirs))
    }

    /// Delete the record of a directory that no longer exists.
    pub async fn forget_directory(&self, dir: &DirectoryIdentity) -> Result<(), OrderError> {
        let _guard = self.locks.lock(dir).await;
        self.cache.remove(dir).await
    }

    /// Bring records in line with a change already applied to the filesystem.
    pub async fn handle_event(&self, event: &ChangeEvent) -> Result<(), OrderError> {
        debug!(event = ?event, "Handling change event");
        match event {
            // The next reconciliation appends it.
            ChangeEvent::Created(_) => Ok(()),
            ChangeEvent::Removed(path) => {
                if let Some((parent, name)) = split_child(path) {
                    self.drop_child(&DirectoryIdentity::from(parent), &name).await?;
                }
                self.forget_directory(&DirectoryIdentity::from(path.as_path())).await
            }
            ChangeEvent::Renamed { from, to } => {
                match (split_child(from), split_child(to)) {
                    (Some((parent, old)), Some((_, new))) if event.is_in_place_rename() => {
                        self.rename_child(&DirectoryIdentity::from(parent), &old, &new)
                            .await?;
                    }
                    (Some((parent, old)), _) => {
                        self.drop_child(&DirectoryIdentity::from(parent), &old).await?;
                    }
                    _ => {}
                }
                self.relocate_tree(
                    &DirectoryIdentity::from(from.as_path()),
                    &DirectoryIdentity::from(to.as_path()),
                    true,
                )
                .await
                .map(|_| ())
            }
            ChangeEvent::Copied { from, to } => self
                .relocate_tree(
                    &DirectoryIdentity::from(from.as_path()),
                    &DirectoryIdentity::from(to.as_path()),
                    false,
                )
                .await
                .map(|_| ()),
        }
    }

    /// Remove `name` from the record of `parent`, if it has one.
    async fn drop_child(&self, parent: &DirectoryIdentity, name: &str) -> Result<(), OrderError> {
        let _guard = self.locks.lock(parent).await;
        let Some(record) = self.cache.get(parent).await? else {
            return Ok(());
        };
        let Some(index) = record.position(name) else {
            return Ok(());
        };
        let order = mutation::remove(record.names(), index)?;
        self.cache.set(parent, OrderRecord::new(order)).await?;
        info!(directory = %parent, name, "Dropped removed entry from order");
        Ok(())
    }

    /// Replace `old` with `new` in the record of `parent`, keeping its position.
    async fn rename_child(&self, parent: &DirectoryIdentity, old: &str, new: &str) -> Result<(), OrderError> {
        let _guard = self.locks.lock(parent).await;
        let Some(record) = self.cache.get(parent).await? else {
            return Ok(());
        };
        let Some(index) = record.position(old) else {
            return Ok(());
        };
        let order = mutation::update(record.names(), new, index)?;
        self.cache.set(parent, OrderRecord::new(order)).await?;
        info!(directory = %parent, old, new, "Renamed entry in order");
        Ok(())
    }
}

fn descend(base: &DirectoryIdentity, rel: &Path) -> DirectoryIdentity {
    if rel.as_os_str().is_empty() {
        base.clone()
    } else {
        DirectoryIdentity::new(base.path().join(rel))
    }
}
