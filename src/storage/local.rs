//! `tokio::fs` backed storage provider.

use super::{DeleteOptions, FileStat, StorageProvider, WriteOptions};
use crate::error::StorageError;
use crate::types::{ChildEntry, EntryKind};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// Storage provider over the local filesystem.
pub struct LocalFsStorage;

impl LocalFsStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFsStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of(metadata: &std::fs::Metadata) -> EntryKind {
    if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

#[async_trait]
impl StorageProvider for LocalFsStorage {
    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Ok(FileStat {
                kind: EntryKind::File,
                children: None,
            });
        }

        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        let mut children = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(path, e))?
        {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!("Skipping non UTF8 entry {:?} in {}", raw, path.display());
                    continue;
                }
            };
            // Follow symlinks; skip dangling ones.
            let kind = match fs::metadata(entry.path()).await {
                Ok(metadata) => kind_of(&metadata),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            children.push(ChildEntry { name, kind });
        }

        Ok(FileStat {
            kind: EntryKind::Directory,
            children: Some(children),
        })
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        fs::read(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))
    }

    async fn write_file(
        &self,
        path: &Path,
        bytes: &[u8],
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        let exists = self.exists(path).await?;
        if exists && !options.overwrite {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        if !exists && !options.create {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        fs::write(path, bytes)
            .await
            .map_err(|e| StorageError::from_io(path, e))
    }

    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        fs::try_exists(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))
    }

    async fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))
    }

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), StorageError> {
        let metadata = fs::symlink_metadata(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        let result = if metadata.is_dir() {
            if options.recursive {
                fs::remove_dir_all(path).await
            } else {
                fs::remove_dir(path).await
            }
        } else {
            fs::remove_file(path).await
        };
        result.map_err(|e| StorageError::from_io(path, e))
    }

    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        fs::rename(from, to)
            .await
            .map_err(|e| StorageError::from_io(from, e))
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        fs::copy(from, to)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::from_io(from, e))
    }
}
