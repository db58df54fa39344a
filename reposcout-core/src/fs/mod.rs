//! Filesystem inspection helpers
//!
//! Read-only queries used by the repository locator: listing a directory's
//! children, checking entry types, and spotting git working copies.

mod inspect;

pub use inspect::{is_directory, is_git_working_copy, list_children, GIT_MARKER_SUFFIX};
