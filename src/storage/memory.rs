//! In-memory storage provider.
//!
//! Used by tests and by embedders that keep metadata somewhere other than the
//! local disk. Counts writes and deletes, and can be told to fail reads or
//! writes so callers can exercise failure paths.

use super::{DeleteOptions, FileStat, StorageProvider, WriteOptions};
use crate::error::StorageError;
use crate::types::{ChildEntry, EntryKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Directory,
}

/// In-memory filesystem tree.
#[derive(Default)]
pub struct MemoryStorage {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    writes: AtomicUsize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory and its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut nodes = self.nodes.lock();
        insert_ancestors(&mut nodes, path.as_ref());
        nodes.insert(path.as_ref().to_path_buf(), Node::Directory);
    }

    /// Create a file (and its ancestor directories) with the given contents.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let mut nodes = self.nodes.lock();
        if let Some(parent) = path.as_ref().parent() {
            insert_ancestors(&mut nodes, parent);
            nodes.insert(parent.to_path_buf(), Node::Directory);
        }
        nodes.insert(path.as_ref().to_path_buf(), Node::File(contents.into()));
    }

    /// Remove an entry and everything beneath it, bypassing counters.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.nodes.lock().retain(|p, _| !p.starts_with(path));
    }

    /// Move an entry and everything beneath it, bypassing counters.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        let mut nodes = self.nodes.lock();
        relocate_subtree(&mut nodes, from.as_ref(), to.as_ref(), true);
    }

    /// Copy an entry and everything beneath it, bypassing counters.
    pub fn duplicate(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        let mut nodes = self.nodes.lock();
        relocate_subtree(&mut nodes, from.as_ref(), to.as_ref(), false);
    }

    /// Contents of the file at `path`, if any.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.lock().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// All file paths beneath `root`.
    pub fn files_under(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root.as_ref();
        self.nodes
            .lock()
            .iter()
            .filter(|(p, node)| p.starts_with(root) && matches!(node, Node::File(_)))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Successful `write_file`, `move_to` and `copy_to` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Successful `delete` calls.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

fn insert_ancestors(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        nodes
            .entry(ancestor.to_path_buf())
            .or_insert(Node::Directory);
    }
}

fn parent_is_directory(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            matches!(nodes.get(parent), Some(Node::Directory))
        }
        _ => true,
    }
}

fn relocate_subtree(nodes: &mut BTreeMap<PathBuf, Node>, from: &Path, to: &Path, is_move: bool) {
    let moved: Vec<(PathBuf, Node)> = nodes
        .iter()
        .filter(|(p, _)| p.starts_with(from))
        .map(|(p, node)| (p.clone(), node.clone()))
        .collect();
    if is_move {
        nodes.retain(|p, _| !p.starts_with(from));
    }
    insert_ancestors(nodes, to);
    for (path, node) in moved {
        let rel = path.strip_prefix(from).unwrap_or(Path::new(""));
        let target = if rel.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(rel)
        };
        nodes.insert(target, node);
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        self.check_reads()?;
        let nodes = self.nodes.lock();
        match nodes.get(path) {
            None => Err(StorageError::NotFound(path.to_path_buf())),
            Some(Node::File(_)) => Ok(FileStat {
                kind: EntryKind::File,
                children: None,
            }),
            Some(Node::Directory) => {
                let children = nodes
                    .iter()
                    .filter(|(p, _)| p.parent() == Some(path))
                    .filter_map(|(p, node)| {
                        let name = p.file_name()?.to_string_lossy().into_owned();
                        let kind = match node {
                            Node::File(_) => EntryKind::File,
                            Node::Directory => EntryKind::Directory,
                        };
                        Some(ChildEntry { name, kind })
                    })
                    .collect();
                Ok(FileStat {
                    kind: EntryKind::Directory,
                    children: Some(children),
                })
            }
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.check_reads()?;
        match self.nodes.lock().get(path) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Directory) => Err(StorageError::Unavailable(format!(
                "{} is a directory",
                path.display()
            ))),
            None => Err(StorageError::NotFound(path.to_path_buf())),
        }
    }

    async fn write_file(
        &self,
        path: &Path,
        bytes: &[u8],
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut nodes = self.nodes.lock();
        if !parent_is_directory(&nodes, path) {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        match nodes.get(path) {
            Some(Node::Directory) => {
                return Err(StorageError::AlreadyExists(path.to_path_buf()));
            }
            Some(Node::File(_)) if !options.overwrite => {
                return Err(StorageError::AlreadyExists(path.to_path_buf()));
            }
            None if !options.create => {
                return Err(StorageError::NotFound(path.to_path_buf()));
            }
            _ => {}
        }
        nodes.insert(path.to_path_buf(), Node::File(bytes.to_vec()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        self.check_reads()?;
        Ok(self.nodes.lock().contains_key(path))
    }

    async fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut nodes = self.nodes.lock();
        if let Some(Node::File(_)) = nodes.get(path) {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        insert_ancestors(&mut nodes, path);
        nodes.insert(path.to_path_buf(), Node::Directory);
        Ok(())
    }

    async fn delete(&self, path: &Path, options: DeleteOptions) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut nodes = self.nodes.lock();
        match nodes.get(path) {
            None => return Err(StorageError::NotFound(path.to_path_buf())),
            Some(Node::Directory) if !options.recursive => {
                let has_children = nodes.keys().any(|p| p.parent() == Some(path));
                if has_children {
                    return Err(StorageError::Unavailable(format!(
                        "directory not empty: {}",
                        path.display()
                    )));
                }
            }
            _ => {}
        }
        nodes.retain(|p, _| !p.starts_with(path));
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut nodes = self.nodes.lock();
        if !nodes.contains_key(from) {
            return Err(StorageError::NotFound(from.to_path_buf()));
        }
        if !parent_is_directory(&nodes, to) {
            return Err(StorageError::NotFound(to.to_path_buf()));
        }
        nodes.retain(|p, _| !p.starts_with(to));
        relocate_subtree(&mut nodes, from, to, true);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut nodes = self.nodes.lock();
        if !nodes.contains_key(from) {
            return Err(StorageError::NotFound(from.to_path_buf()));
        }
        if !parent_is_directory(&nodes, to) {
            return Err(StorageError::NotFound(to.to_path_buf()));
        }
        nodes.retain(|p, _| !p.starts_with(to));
        relocate_subtree(&mut nodes, from, to, false);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
