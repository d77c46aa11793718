//! Error types for the order engine and its storage collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a [`StorageProvider`](crate::storage::StorageProvider).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Wrap an `std::io::Error`, keeping `NotFound`/`AlreadyExists` distinguishable.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path),
            _ => StorageError::Io { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Engine-level errors.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The storage collaborator failed. Never retried by the engine.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// An order record on disk could not be decoded.
    #[error("Corrupt order record at {}: {reason}", path.display())]
    RecordCorrupt { path: PathBuf, reason: String },

    /// A lot operation was malformed; nothing was applied.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// A single-item operation referenced a position outside the order.
    #[error("Index {index} out of range for order of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
