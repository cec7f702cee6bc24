// Central Error Type for the Engine

use thiserror::Error;

/// Engine-level error type
///
/// Every variant aborts the convergence pass immediately; exhausting the
/// retry budget is not an error but an `Outcome` (see domain::outcome).
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::domain::ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] crate::port::CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using WaitError
pub type Result<T> = std::result::Result<T, WaitError>;
