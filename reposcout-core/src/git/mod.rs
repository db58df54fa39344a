//! Git operations for reposcout
//!
//! This module provides repository location, command execution, and the
//! submodule clone/checkout/sync lifecycle.

mod exec;
mod locate;
mod submodule;

pub use exec::{
    CommandAvailability, CommandExecutor, ExecOutcome, ExecRequest, ProbeAvailability,
    ShellExecutor,
};
pub use locate::{resolve_path, RepositoryLocator, RepositoryReference, Resolution};
pub use submodule::{
    checkout_command, pull_command, update_command, work_tree_scope, SubmoduleDescriptor,
    SubmoduleLifecycle, DEFAULT_BRANCH,
};

/// Check whether a directory is the root of a local git working copy
pub use crate::fs::is_git_working_copy;
