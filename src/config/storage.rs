//! StorageConfig and metadata root resolution.

use crate::config::xdg;
use crate::error::OrderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_METADATA_PATH: &str = ".dirorder/order";

fn default_metadata_path() -> PathBuf {
    PathBuf::from(DEFAULT_METADATA_PATH)
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the order record buckets (relative to workspace root)
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
}

impl StorageConfig {
    /// Resolve the metadata root.
    ///
    /// The default lives in the XDG data directory for the workspace, so the
    /// workspace itself stays free of metadata. Any other value is taken
    /// relative to the workspace root.
    pub fn resolve_metadata_root(&self, workspace_root: &Path) -> Result<PathBuf, OrderError> {
        if self.metadata_path == Path::new(DEFAULT_METADATA_PATH) {
            let data_dir = xdg::workspace_data_dir(workspace_root)?;
            return Ok(data_dir.join("order"));
        }
        Ok(workspace_root.join(&self.metadata_path))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_path: default_metadata_path(),
        }
    }
}
