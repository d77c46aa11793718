//! Core types for the directory order engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a directory child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A live child of a directory as reported by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl ChildEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Canonical absolute location of a directory.
///
/// Not a stable ID: a rename or move yields a different identity, which is why
/// records are addressed through a derived [`StorageKey`](crate::key::StorageKey).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryIdentity(PathBuf);

impl DirectoryIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Identity of a child directory.
    pub fn join(&self, name: &str) -> Self {
        Self(self.0.join(name))
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| Self(p.to_path_buf()))
    }

    pub fn file_name(&self) -> Option<String> {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

impl fmt::Display for DirectoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&Path> for DirectoryIdentity {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<PathBuf> for DirectoryIdentity {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Persisted ordered list of child names for one directory.
///
/// Serialized as a bare JSON array of strings. Duplicates are never kept: the
/// first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OrderRecord {
    names: Vec<String>,
}

impl OrderRecord {
    pub fn new(names: Vec<String>) -> Self {
        let mut seen = HashSet::with_capacity(names.len());
        let names = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl From<Vec<String>> for OrderRecord {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<OrderRecord> for Vec<String> {
    fn from(record: OrderRecord) -> Self {
        record.names
    }
}
