//! XDG Base Directory utilities.

use crate::error::OrderError;
use std::path::{Component, Path, PathBuf};

/// `$XDG_DATA_HOME`, falling back to `$HOME/.local/share`.
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
pub fn config_home() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config"))
}

/// Global config file: `$XDG_CONFIG_HOME/dirorder/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    config_home().map(|home| home.join("dirorder").join("config.toml"))
}

/// Data directory for one workspace.
///
/// Returns `$XDG_DATA_HOME/dirorder/<canonical workspace path>/`; for example
/// `/home/user/notes` maps to `$XDG_DATA_HOME/dirorder/home/user/notes/`.
pub fn workspace_data_dir(workspace_root: &Path) -> Result<PathBuf, OrderError> {
    let data_home = data_home().ok_or_else(|| {
        OrderError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;

    let canonical = dunce::canonicalize(workspace_root).map_err(|e| {
        OrderError::ConfigError(format!(
            "Failed to canonicalize workspace path {}: {}",
            workspace_root.display(),
            e
        ))
    })?;

    let mut data_dir = data_home.join("dirorder");
    for component in canonical.components() {
        if let Component::Normal(name) = component {
            data_dir = data_dir.join(name);
        }
    }
    Ok(data_dir)
}
