//! Storage key derivation
//!
//! Maps a [`DirectoryIdentity`] to a stable, hash-derived location for its
//! order record. The key is a blake3 digest of the identity's raw path
//! bytes, hex encoded and split into a two-character bucket plus the
//! remainder. Only hosts whose filesystems fold names (macOS, Windows) also
//! fold the Unicode form before hashing; elsewhere two spellings that differ
//! in bytes are two directories and keep two keys.

use crate::compare::host_is_case_sensitive;
use crate::types::DirectoryIdentity;
use std::fmt;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Number of hex characters used for the bucket directory.
pub const BUCKET_LEN: usize = 2;

/// Extension of record files.
pub const RECORD_EXTENSION: &str = "json";

/// Hash-derived address of one directory's order record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    pub bucket: String,
    pub remainder: String,
}

impl StorageKey {
    /// Record path under `root`: `<root>/<bucket>/<remainder>.json`.
    pub fn record_path(&self, root: &Path) -> PathBuf {
        root.join(&self.bucket)
            .join(format!("{}.{}", self.remainder, RECORD_EXTENSION))
    }

    pub fn bucket_path(&self, root: &Path) -> PathBuf {
        root.join(&self.bucket)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.remainder)
    }
}

/// Derive the storage key for a directory. Pure and stable across processes.
pub fn derive_key(identity: &DirectoryIdentity) -> StorageKey {
    let normalized = normalize_identity(identity.path(), !host_is_case_sensitive());
    let digest = blake3::hash(&normalized);
    let encoded = hex::encode(digest.as_bytes());
    let (bucket, remainder) = encoded.split_at(BUCKET_LEN);
    StorageKey {
        bucket: bucket.to_string(),
        remainder: remainder.to_string(),
    }
}

/// Raw identity bytes with trailing separators stripped. With `fold_unicode`,
/// identities that are valid UTF-8 are NFC-normalized first.
fn normalize_identity(path: &Path, fold_unicode: bool) -> Vec<u8> {
    let raw = path.as_os_str().as_encoded_bytes();
    let mut end = raw.len();
    // Keep a lone separator: that is the root itself.
    while end > 1 && raw[end - 1].is_ascii() && std::path::is_separator(raw[end - 1] as char) {
        end -= 1;
    }
    let trimmed = &raw[..end];

    if fold_unicode {
        if let Ok(text) = std::str::from_utf8(trimmed) {
            return text.nfc().collect::<String>().into_bytes();
        }
    }
    trimmed.to_vec()
}
