//! Storage collaborator contract.
//!
//! The order engine never touches the filesystem directly. Listing live
//! children and persisting record files both go through a [`StorageProvider`].

pub mod local;
pub mod memory;

use crate::error::StorageError;
use crate::types::{ChildEntry, EntryKind};
use async_trait::async_trait;
use std::path::Path;

pub use local::LocalFsStorage;
pub use memory::MemoryStorage;

/// Result of [`StorageProvider::stat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    /// Immediate children; `None` for files.
    pub children: Option<Vec<ChildEntry>>,
}

impl FileStat {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub create: bool,
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOptions {
    pub recursive: bool,
}

/// Byte-level storage operations consumed by the engine.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Kind of the entry at `path`, with its children if it is a directory.
    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError>;

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    async fn write_file(
        &self,
        path: &Path,
        bytes: &[u8],
        options: WriteOptions,
    ) -> Result<(), StorageError>;

    async fn exists(&self, path: &Path) -> Result<bool, StorageError>;

    /// Create `path` and any missing parents.
    async fn create_dir(&self, path: &Path) -> Result<(), StorageError>;

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), StorageError>;

    /// Move `from` to `to`, replacing an existing file at `to`.
    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Copy the file `from` to `to`, replacing an existing file at `to`.
    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), StorageError>;
}
