//! Configuration
//!
//! Layered configuration for the order engine: built-in defaults, the global
//! config file, the workspace config file and `DIRORDER__*` environment
//! variables, in increasing precedence.

pub mod facade;
mod sources;
pub mod storage;
pub mod xdg;

pub use facade::ConfigLoader;
pub use storage::StorageConfig;

use crate::compare::{CaseSensitivity, Comparator};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Default-order policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// `sensitive`, `insensitive` or `host`
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,

    /// List directories before files (default: true)
    #[serde(default = "default_true")]
    pub directories_first: bool,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            case_sensitivity: CaseSensitivity::default(),
            directories_first: default_true(),
        }
    }
}

/// Metadata cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached directories; 0 means unbounded
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    4096
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ordering: OrderingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OrderConfig {
    /// Comparator described by the `ordering` section.
    pub fn comparator(&self) -> Comparator {
        Comparator::new(self.ordering.case_sensitivity)
            .with_directories_first(self.ordering.directories_first)
    }
}
