//! Reposcout Core - locate local git clones and drive submodule updates
//!
//! This crate resolves symbolic repository references (`auto:<name>`,
//! `remote`, or an absolute path) to directories on disk, and runs the
//! clone/checkout/pull sequence that keeps a git submodule in sync with
//! its origin.

pub mod config;
pub mod error;
pub mod fs;
pub mod git;

pub use config::{Config, GitConfig};
pub use error::{Error, Result};
pub use git::{
    CommandAvailability, CommandExecutor, ExecOutcome, ExecRequest, ProbeAvailability,
    RepositoryLocator, RepositoryReference, Resolution, ShellExecutor, SubmoduleDescriptor,
    SubmoduleLifecycle,
};
