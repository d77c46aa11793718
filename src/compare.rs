//! Default order policy.
//!
//! Directories before files, then basenames compared with or without case
//! folding depending on the configured case sensitivity.

use crate::types::ChildEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How basenames are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
    /// Follow the host filesystem convention.
    #[default]
    Host,
}

impl CaseSensitivity {
    pub fn is_case_sensitive(self) -> bool {
        match self {
            CaseSensitivity::Sensitive => true,
            CaseSensitivity::Insensitive => false,
            CaseSensitivity::Host => host_is_case_sensitive(),
        }
    }
}

/// macOS and Windows filesystems are case-insensitive by default.
pub fn host_is_case_sensitive() -> bool {
    !cfg!(any(target_os = "macos", target_os = "windows"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    case_sensitive: bool,
    directories_first: bool,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CaseSensitivity::Host)
    }
}

impl Comparator {
    pub fn new(case_sensitivity: CaseSensitivity) -> Self {
        Self {
            case_sensitive: case_sensitivity.is_case_sensitive(),
            directories_first: true,
        }
    }

    pub fn with_directories_first(mut self, directories_first: bool) -> Self {
        self.directories_first = directories_first;
        self
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Total order over two children.
    pub fn compare(&self, a: &ChildEntry, b: &ChildEntry) -> Ordering {
        if self.directories_first {
            match (a.is_directory(), b.is_directory()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
        self.compare_names(&a.name, &b.name)
    }

    pub fn compare_names(&self, a: &str, b: &str) -> Ordering {
        if self.case_sensitive {
            return a.cmp(b);
        }
        // Fall back to the raw bytes so names differing only in case still
        // get a stable order.
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    }

    pub fn sort(&self, entries: &mut [ChildEntry]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }

    /// Names of `entries` in default order.
    pub fn sorted_names(&self, entries: &[ChildEntry]) -> Vec<String> {
        let mut sorted = entries.to_vec();
        self.sort(&mut sorted);
        sorted.into_iter().map(|e| e.name).collect()
    }
}
