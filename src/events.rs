//! Filesystem change events fed to [`OrderEngine::handle_event`](crate::engine::OrderEngine::handle_event).

use std::path::{Path, PathBuf};

/// A change the tree has already applied to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Created(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    Copied { from: PathBuf, to: PathBuf },
}

impl ChangeEvent {
    /// True for a rename that stays within one parent directory.
    pub fn is_in_place_rename(&self) -> bool {
        match self {
            ChangeEvent::Renamed { from, to } => from.parent() == to.parent(),
            _ => false,
        }
    }
}

/// Split a path into its parent and basename.
pub(crate) fn split_child(path: &Path) -> Option<(&Path, String)> {
    let parent = path.parent()?;
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some((parent, name))
}
