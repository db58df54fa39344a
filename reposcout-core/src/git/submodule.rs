//! Submodule lifecycle: clone, checkout, and sync with origin
//!
//! Command construction is kept in pure functions so it can be checked
//! without running anything. [`SubmoduleLifecycle`] hands the built commands
//! to a [`CommandExecutor`] one at a time.

use serde::{Deserialize, Serialize};

use super::exec::{CommandAvailability, CommandExecutor, ExecOutcome, ExecRequest};
use crate::config::{Config, DEFAULT_GIT_PROGRAM};

/// Branch used when a descriptor does not name one
pub const DEFAULT_BRANCH: &str = "master";

/// Describes one submodule and how to bring it up to date
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmoduleDescriptor {
    /// Display name used in log messages
    pub name: String,

    /// Path of the submodule's working copy
    pub destination: String,

    /// Local repository to borrow objects from when cloning (empty for none)
    #[serde(default)]
    pub reference: String,

    /// Branch or tag to check out and pull
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Abort the process when a step fails instead of carrying on
    #[serde(default)]
    pub fatality: bool,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl SubmoduleDescriptor {
    /// Create a descriptor with the default branch and no reference
    pub fn new(name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            reference: String::new(),
            branch: default_branch(),
            fatality: false,
        }
    }

    /// Set the branch or tag
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the local object-store reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Make step failures fatal
    pub fn with_fatality(mut self, fatality: bool) -> Self {
        self.fatality = fatality;
        self
    }
}

/// Arguments scoping a git command to the working copy at `destination`
///
/// Empty when `destination` is empty, so the command applies to the current
/// repository.
pub fn work_tree_scope(destination: &str) -> String {
    if destination.is_empty() {
        String::new()
    } else {
        format!("--git-dir={0}/.git --work-tree={0}", destination)
    }
}

/// `git submodule update --init [--reference <ref>] <destination>`
pub fn update_command(program: &str, descriptor: &SubmoduleDescriptor) -> String {
    let reference = if descriptor.reference.is_empty() {
        String::new()
    } else {
        format!("--reference {}", descriptor.reference)
    };

    join_args(&[
        program,
        "submodule update --init",
        &reference,
        &descriptor.destination,
    ])
}

/// `git [scope] checkout <branch>`
pub fn checkout_command(program: &str, descriptor: &SubmoduleDescriptor) -> String {
    join_args(&[
        program,
        &work_tree_scope(&descriptor.destination),
        "checkout",
        &descriptor.branch,
    ])
}

/// `git [scope] pull origin <branch>`
pub fn pull_command(program: &str, descriptor: &SubmoduleDescriptor) -> String {
    join_args(&[
        program,
        &work_tree_scope(&descriptor.destination),
        "pull origin",
        &descriptor.branch,
    ])
}

fn join_args(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs the submodule lifecycle through an executor
#[derive(Debug)]
pub struct SubmoduleLifecycle<E, A> {
    executor: E,
    availability: A,
    program: String,
}

impl<E: CommandExecutor, A: CommandAvailability> SubmoduleLifecycle<E, A> {
    /// Create a lifecycle that invokes `git` from `PATH`
    pub fn new(executor: E, availability: A) -> Self {
        Self {
            executor,
            availability,
            program: DEFAULT_GIT_PROGRAM.to_string(),
        }
    }

    /// Create a lifecycle using the configured git program
    pub fn from_config(config: &Config, executor: E, availability: A) -> Self {
        Self::new(executor, availability).with_program(config.git.program.clone())
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The git executable commands are built with
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that git can be invoked
    ///
    /// Logs a warning and returns `false` when it cannot.
    pub fn require_git_available(&self) -> bool {
        if self.availability.is_available(&self.program) {
            return true;
        }

        tracing::warn!(
            program = %self.program,
            "git is not available; skipping submodule operations"
        );
        false
    }

    /// Clone (if needed), check out, and pull a submodule
    ///
    /// All three steps are submitted in order. Whether a failed step stops
    /// the process is up to the executor, based on the descriptor's
    /// `fatality`. Returns the outcome of each step that ran; empty when git
    /// is not available.
    pub fn ensure_submodule(
        &self,
        descriptor: &SubmoduleDescriptor,
        verbose: bool,
    ) -> Vec<ExecOutcome> {
        if !self.require_git_available() {
            return Vec::new();
        }

        self.run_lifecycle(descriptor, verbose)
    }

    /// Check out the descriptor's branch without cloning or pulling
    pub fn checkout_submodule(
        &self,
        descriptor: &SubmoduleDescriptor,
        verbose: bool,
    ) -> Vec<ExecOutcome> {
        if !self.require_git_available() {
            return Vec::new();
        }

        let name = &descriptor.name;
        let branch = &descriptor.branch;
        let outcome = self.executor.execute(&ExecRequest {
            command: checkout_command(&self.program, descriptor),
            success: format!("checked out {} at '{}'", name, branch),
            error: format!("failed checking out '{}' at '{}'", name, branch),
            fatal: descriptor.fatality,
            verbose,
        });

        vec![outcome]
    }

    /// Run [`ensure_submodule`](Self::ensure_submodule) for each descriptor
    ///
    /// Git availability is checked once up front.
    pub fn ensure_all(
        &self,
        descriptors: &[SubmoduleDescriptor],
        verbose: bool,
    ) -> Vec<Vec<ExecOutcome>> {
        if descriptors.is_empty() || !self.require_git_available() {
            return Vec::new();
        }

        descriptors
            .iter()
            .map(|descriptor| self.run_lifecycle(descriptor, verbose))
            .collect()
    }

    fn run_lifecycle(&self, descriptor: &SubmoduleDescriptor, verbose: bool) -> Vec<ExecOutcome> {
        let name = &descriptor.name;
        let branch = &descriptor.branch;
        let fatal = descriptor.fatality;

        tracing::debug!(
            name = %name,
            destination = %descriptor.destination,
            branch = %branch,
            "Ensuring submodule"
        );

        let steps = [
            ExecRequest {
                command: update_command(&self.program, descriptor),
                success: format!("submodule '{}' cloned", name),
                error: format!("failed cloning submodule '{}'", name),
                fatal,
                verbose,
            },
            ExecRequest {
                command: checkout_command(&self.program, descriptor),
                success: format!("submodule '{}' checked out at '{}'", name, branch),
                error: format!("failed checking out submodule '{}' at '{}'", name, branch),
                fatal,
                verbose,
            },
            ExecRequest {
                command: pull_command(&self.program, descriptor),
                success: format!("synchronized with remote origin '{}'", branch),
                error: format!("failed pulling from remote origin '{}'", branch),
                fatal,
                verbose,
            },
        ];

        steps
            .iter()
            .map(|request| self.executor.execute(request))
            .collect()
    }
}
