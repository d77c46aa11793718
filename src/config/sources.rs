//! Configuration sources, lowest precedence first.

use super::xdg;
use super::OrderConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Workspace-local config file name.
pub const WORKSPACE_CONFIG_FILE: &str = ".dirorder.toml";

/// Builder seeded with the built-in defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&OrderConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}

/// Optional global file under the XDG config home.
pub fn add_global_file(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match xdg::global_config_path() {
        Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml).required(false)),
        None => builder,
    }
}

/// Optional `.dirorder.toml` at the workspace root.
pub fn add_workspace_file(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let path = workspace_root.join(WORKSPACE_CONFIG_FILE);
    builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
}

/// `DIRORDER__SECTION__KEY` environment overlay.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("DIRORDER")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
