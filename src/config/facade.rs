//! ConfigLoader facade over the layered sources.

use super::sources;
use super::OrderConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    /// Precedence: defaults (lowest) -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<OrderConfig, ConfigError> {
        let builder = sources::builder_with_defaults()?;
        let builder = sources::add_global_file(builder);
        let builder = sources::add_workspace_file(builder, workspace_root);
        let builder = sources::add_environment(builder);

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<OrderConfig, ConfigError> {
        let builder = sources::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        let builder = sources::add_environment(builder);

        builder.build()?.try_deserialize()
    }
}
