//! dirorder: Persistent Custom Directory Order
//!
//! Keeps a user-defined order for the children of each directory, stored
//! apart from the directory itself under a hash-derived key. Directories
//! without a record fall back to the default comparator order; records follow
//! their directories through moves and copies.

pub mod cache;
pub mod compare;
pub mod concurrency;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod key;
pub mod logging;
pub mod mutation;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod tooling;
pub mod types;

pub use cache::{CacheStats, MetadataCache};
pub use compare::{CaseSensitivity, Comparator};
pub use config::{ConfigLoader, OrderConfig};
pub use engine::{EngineOptions, OrderEngine};
pub use error::{OrderError, StorageError};
pub use events::ChangeEvent;
pub use key::{derive_key, StorageKey};
pub use mutation::OrderChange;
pub use storage::{LocalFsStorage, MemoryStorage, StorageProvider};
pub use types::{ChildEntry, DirectoryIdentity, EntryKind, OrderRecord};
