//! Configuration management for reposcout
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (REPOSCOUT_*)
//! 2. Config file (~/.config/reposcout/config.toml)
//! 3. Default values
//!
//! Besides the git settings, the file can carry a manifest of submodules:
//!
//! ```toml
//! verbose = true
//!
//! [git]
//! program = "/usr/bin/git"
//!
//! [[submodule]]
//! name = "docs"
//! destination = "/src/app/docs"
//! branch = "main"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::git::SubmoduleDescriptor;
use crate::{Error, Result};

/// Git executable used when nothing else is configured
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Git-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_GIT_PROGRAM.to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Echo commands and their output
    pub verbose: bool,

    /// Git configuration
    pub git: GitConfig,

    /// Submodules to keep in sync
    #[serde(rename = "submodule")]
    pub submodules: Vec<SubmoduleDescriptor>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        tracing::debug!(path = %path.display(), "Loading configuration");
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reposcout/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reposcout").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REPOSCOUT_GIT: Path to git executable
    /// - REPOSCOUT_VERBOSE: `1`, `true` or `yes` to enable verbose output
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("REPOSCOUT_GIT").ok(),
            std::env::var("REPOSCOUT_VERBOSE").ok(),
        )
    }

    fn with_overrides(mut self, git: Option<String>, verbose: Option<String>) -> Self {
        if let Some(program) = git.filter(|p| !p.is_empty()) {
            self.git.program = program;
        }

        if let Some(value) = verbose {
            self.verbose = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: env > config file > defaults
    pub fn load_with_overrides() -> Result<Self> {
        Ok(Self::load()?.with_env_overrides())
    }
}
