//! Directory listing and git working copy detection

use std::io;
use std::path::{Path, PathBuf};

/// Suffix that marks a child directory as git metadata
pub const GIT_MARKER_SUFFIX: &str = ".git";

/// List the immediate children of a directory as full paths
///
/// Fails if the directory cannot be read (missing, not a directory, or
/// permission denied). Entries that vanish while iterating are skipped.
pub fn list_children(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut children = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
            }
        }
    }

    Ok(children)
}

/// Check whether a path is a directory, following symlinks
///
/// Missing or unreadable paths are reported as `false`.
pub fn is_directory(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path.as_ref())
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Check whether a directory is the root of a local git working copy
///
/// A directory qualifies when one of its immediate children is a directory
/// whose name ends in `.git`. This is a naming heuristic only; the metadata
/// directory itself is never validated, so `vendor.git/` counts as well.
pub fn is_git_working_copy(dir: impl AsRef<Path>) -> bool {
    let Ok(children) = list_children(dir.as_ref()) else {
        return false;
    };

    children.iter().any(|child| has_marker_name(child) && is_directory(child))
}

fn has_marker_name(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(GIT_MARKER_SUFFIX))
        .unwrap_or(false)
}
