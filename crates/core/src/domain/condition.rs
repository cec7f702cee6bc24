// Condition Domain Model
// One closed tagged variant per waitable condition kind; the engine
// selects the matching evaluator with a single switch at loop entry.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The thing being waited for
#[derive(Debug, Clone)]
pub enum Condition {
    /// Satisfied when the query's exit status is a member of the set
    ExitCode(BTreeSet<i32>),
    /// Satisfied when the query's combined output contains a match
    /// (substring semantics, no anchoring)
    Pattern(Regex),
    /// One sleep of the given duration, always satisfied afterwards
    FixedDuration(Duration),
    /// Satisfied when the filesystem entry at `path` is in the wanted state
    FilesystemState {
        path: PathBuf,
        want: PathExpectation,
    },
}

impl Condition {
    /// Human-readable tag used in log lines and exhausted reports
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::ExitCode(_) => "exit_code",
            Condition::Pattern(_) => "regex",
            Condition::FixedDuration(_) => "seconds",
            Condition::FilesystemState { .. } => "path",
        }
    }

    /// Whether evaluating this condition requires running the query command
    pub fn needs_query(&self) -> bool {
        matches!(self, Condition::ExitCode(_) | Condition::Pattern(_))
    }
}

/// Wanted filesystem state for a path condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathExpectation {
    /// The entry does not exist
    Absent,
    /// The entry exists, whatever its type
    Present,
    /// The entry is a regular file
    File,
    /// The entry is a directory
    Directory,
}

impl std::fmt::Display for PathExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathExpectation::Absent => write!(f, "absent"),
            PathExpectation::Present => write!(f, "present"),
            PathExpectation::File => write!(f, "file"),
            PathExpectation::Directory => write!(f, "directory"),
        }
    }
}

impl FromStr for PathExpectation {
    type Err = crate::domain::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absent" => Ok(PathExpectation::Absent),
            "present" => Ok(PathExpectation::Present),
            "file" => Ok(PathExpectation::File),
            "directory" => Ok(PathExpectation::Directory),
            other => Err(crate::domain::ConfigError::UnknownWant(other.to_string())),
        }
    }
}

/// Observed filesystem state, as classified by the PathProbe port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    Missing,
    File,
    Directory,
    /// Exists but is neither a regular file nor a directory
    Other,
}

impl PathState {
    pub fn exists(&self) -> bool {
        !matches!(self, PathState::Missing)
    }
}
