//! Error types for reposcout

use thiserror::Error;

/// Result type alias for reposcout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reposcout operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A shell command could not be run
    #[error("Command error: {0}")]
    Command(String),
}
