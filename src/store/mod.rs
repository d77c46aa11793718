//! Order Record Store
//!
//! Reads and writes one directory's order record through the storage
//! collaborator. Records live at `<root>/<bucket>/<remainder>.json`, where the
//! bucket and remainder come from [`derive_key`]. A missing file means the
//! directory uses the default order.

use crate::error::{OrderError, StorageError};
use crate::key::{derive_key, StorageKey};
use crate::storage::{DeleteOptions, StorageProvider, WriteOptions};
use crate::types::{DirectoryIdentity, OrderRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistence for order records.
pub struct MetadataStore {
    storage: Arc<dyn StorageProvider>,
    root: PathBuf,
}

impl MetadataStore {
    /// Create a store that keeps its records under `root`.
    pub fn new(storage: Arc<dyn StorageProvider>, root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.storage
    }

    /// Location of the record file for `identity`.
    pub fn record_path(&self, identity: &DirectoryIdentity) -> PathBuf {
        derive_key(identity).record_path(&self.root)
    }

    /// Load the record for `identity`.
    ///
    /// Returns `Ok(None)` when no record exists. A record that fails to decode
    /// is logged and reported as absent, so the directory falls back to the
    /// default order until the next mutation writes a fresh record.
    pub async fn load(&self, identity: &DirectoryIdentity) -> Result<Option<OrderRecord>, OrderError> {
        let path = self.record_path(identity);
        let bytes = match self.storage.read_file(&path).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                debug!(directory = %identity, "No order record");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match decode_record(&path, &bytes) {
            Ok(record) if record.is_empty() => Ok(None),
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(directory = %identity, "{}; using default order", e);
                Ok(None)
            }
        }
    }

    /// Overwrite the record for `identity`, creating its bucket if needed.
    pub async fn save(&self, identity: &DirectoryIdentity, record: &OrderRecord) -> Result<(), OrderError> {
        let key = derive_key(identity);
        let path = key.record_path(&self.root);
        let bytes = serde_json::to_vec(record).map_err(|e| OrderError::RecordCorrupt {
            path: path.clone(),
            reason: format!("Failed to encode record: {}", e),
        })?;

        self.ensure_bucket(&key).await?;
        self.storage
            .write_file(&path, &bytes, WriteOptions::default())
            .await?;
        debug!(directory = %identity, entries = record.len(), "Saved order record");
        Ok(())
    }

    /// Remove the record for `identity`. No-op if there is none.
    pub async fn delete(&self, identity: &DirectoryIdentity) -> Result<(), OrderError> {
        let path = self.record_path(identity);
        match self.storage.delete(&path, DeleteOptions::default()).await {
            Ok(()) => {
                debug!(directory = %identity, "Deleted order record");
                Ok(())
            }
            Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Move (`is_move`) or copy the record of `from` to the key of `to`.
    ///
    /// Returns whether a record was relocated. When `from` has no record and
    /// this is a move, any record already at `to` is removed so the moved
    /// directory keeps the default order it had before.
    pub async fn relocate(
        &self,
        from: &DirectoryIdentity,
        to: &DirectoryIdentity,
        is_move: bool,
    ) -> Result<bool, OrderError> {
        let from_path = self.record_path(from);
        let to_key = derive_key(to);
        let to_path = to_key.record_path(&self.root);
        if from_path == to_path {
            return Ok(self.storage.exists(&from_path).await?);
        }

        if !self.storage.exists(&from_path).await? {
            if is_move {
                self.delete(to).await?;
            }
            return Ok(false);
        }

        self.ensure_bucket(&to_key).await?;
        if is_move {
            self.storage.move_to(&from_path, &to_path).await?;
        } else {
            self.storage.copy_to(&from_path, &to_path).await?;
        }
        info!(
            from = %from,
            to = %to,
            is_move,
            "Relocated order record"
        );
        Ok(true)
    }

    async fn ensure_bucket(&self, key: &StorageKey) -> Result<(), OrderError> {
        let bucket = key.bucket_path(&self.root);
        if !self.storage.exists(&bucket).await? {
            self.storage.create_dir(&bucket).await?;
        }
        Ok(())
    }
}

/// Decode a record file: a JSON array of strings.
pub fn decode_record(path: &Path, bytes: &[u8]) -> Result<OrderRecord, OrderError> {
    serde_json::from_slice::<OrderRecord>(bytes).map_err(|e| OrderError::RecordCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
