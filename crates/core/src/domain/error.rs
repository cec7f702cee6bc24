// Domain Error Types

use thiserror::Error;

/// Rejections produced by the parameter validator.
///
/// These are configuration errors: they surface before any command runs
/// and are never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Exactly one of exit_code, regex, seconds or path is required")]
    NoConditionGiven,

    #[error("Attributes exit_code, regex, seconds and path are mutually exclusive (got {0})")]
    ConflictingConditions(String),

    #[error("A query command is required when waiting on {0}")]
    QueryRequired(&'static str),

    #[error("A query command cannot be combined with a {0} condition")]
    QueryForbidden(&'static str),

    #[error("A path condition requires a 'want' state (absent, present, file or directory)")]
    WantMissing,

    #[error("A 'want' state was given without a path to check")]
    PathMissing,

    #[error("The expected exit code set must not be empty")]
    EmptyExitCodeSet,

    #[error("Invalid regex {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("{0} is not a key=value pair")]
    MalformedEnvSetting(String),

    #[error("Unknown path state {0:?} (expected absent, present, file or directory)")]
    UnknownWant(String),

    #[error("max_retries must be at least 1 (got {0})")]
    InvalidMaxRetries(u32),

    #[error("polling_frequency must not be negative (got {0})")]
    NegativePollingFrequency(f64),

    #[error("timeout must not be negative (got {0})")]
    NegativeTimeout(f64),

    #[error("seconds must not be negative (got {0})")]
    NegativeSeconds(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
