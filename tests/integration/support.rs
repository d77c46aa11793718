use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dirorder::storage::{DeleteOptions, FileStat, WriteOptions};
use dirorder::{
    CaseSensitivity, Comparator, DirectoryIdentity, EngineOptions, MemoryStorage, OrderEngine,
    StorageError, StorageProvider,
};

pub const METADATA_ROOT: &str = "/meta";

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn engine_over(storage: &Arc<MemoryStorage>) -> OrderEngine {
    let options = EngineOptions::new(METADATA_ROOT)
        .with_comparator(Comparator::new(CaseSensitivity::Sensitive));
    OrderEngine::new(storage.clone(), options)
}

/// `/ws` holding `folder1`, `folder2`, `file1`, `file2` and `file3`.
pub fn workspace() -> (Arc<MemoryStorage>, OrderEngine, DirectoryIdentity) {
    let storage = Arc::new(MemoryStorage::new());
    storage.add_dir(METADATA_ROOT);
    storage.add_dir("/ws/folder1");
    storage.add_dir("/ws/folder2");
    for file in ["file1", "file2", "file3"] {
        storage.add_file(format!("/ws/{}", file), "");
    }
    let engine = engine_over(&storage);
    (storage, engine, DirectoryIdentity::new("/ws"))
}

/// Write a record file directly, bypassing the engine.
pub fn seed_record(storage: &MemoryStorage, engine: &OrderEngine, dir: &DirectoryIdentity, order: &[&str]) {
    let bytes = serde_json::to_vec(order).unwrap();
    storage.add_file(engine.record_path(dir), bytes);
}

pub fn has_record(storage: &MemoryStorage, engine: &OrderEngine, dir: &DirectoryIdentity) -> bool {
    storage.file(engine.record_path(dir)).is_some()
}

/// Wraps a [`MemoryStorage`]; the first `read_file` returns only after `delay`.
///
/// The data is read before the pause, so the caller ends up holding whatever
/// was on disk when the read started.
pub struct LaggingReads {
    pub inner: Arc<MemoryStorage>,
    delay: Duration,
    armed: AtomicBool,
}

impl LaggingReads {
    pub fn new(inner: Arc<MemoryStorage>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            armed: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl StorageProvider for LaggingReads {
    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        self.inner.stat(path).await
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let result = self.inner.read_file(path).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
        result
    }

    async fn write_file(
        &self,
        path: &Path,
        bytes: &[u8],
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        self.inner.write_file(path, bytes, options).await
    }

    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        self.inner.exists(path).await
    }

    async fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.inner.create_dir(path).await
    }

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), StorageError> {
        self.inner.delete(path, options).await
    }

    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        self.inner.move_to(from, to).await
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        self.inner.copy_to(from, to).await
    }
}
