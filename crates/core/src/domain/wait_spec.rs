// WaitSpec Domain Model
// Raw parameter document (WaitParams) and its validated, immutable form
// (WaitSpec). Coercion between the two lives in application::validator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Condition;

/// Default polling frequency in seconds
pub const DEFAULT_POLLING_FREQUENCY: f64 = 0.5;

/// Default retry budget
pub const DEFAULT_MAX_RETRIES: u32 = 119;

/// Raw, not-yet-validated wait parameters
///
/// This is the document an embedding host (or the CLI) hands to the
/// validator. Exactly one of `exit_code`, `regex`, `seconds` or `path`
/// must be populated; see application::validator for the full rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitParams {
    /// Shell command line whose output/exit status is observed
    pub query: Option<String>,

    /// Acceptable exit statuses (set membership)
    pub exit_code: Option<Vec<i32>>,

    /// Pattern matched against the query's combined output
    pub regex: Option<String>,

    /// Fixed duration to wait, in seconds
    pub seconds: Option<f64>,

    /// Filesystem entry to observe, together with `want`
    pub path: Option<String>,
    pub want: Option<String>,

    /// Environment overlay entries of the form "key=value"
    pub environment: Vec<String>,

    /// Per-execution timeout in seconds; 0 disables enforcement
    pub timeout: f64,

    /// Retry budget (total attempts under the default pacing)
    pub max_retries: u32,

    /// Sleep between attempts, in seconds
    pub polling_frequency: f64,

    /// Only run when the invocation was triggered by a refresh event
    pub refresh_only: bool,

    /// Legacy accounting: budget counts retries after the first attempt
    pub retries_exclude_first: bool,

    /// Legacy pacing: sleep once more after the final failing attempt
    pub sleep_after_last: bool,
}

impl Default for WaitParams {
    fn default() -> Self {
        Self {
            query: None,
            exit_code: None,
            regex: None,
            seconds: None,
            path: None,
            want: None,
            environment: Vec::new(),
            timeout: 0.0,
            max_retries: DEFAULT_MAX_RETRIES,
            polling_frequency: DEFAULT_POLLING_FREQUENCY,
            refresh_only: false,
            retries_exclude_first: false,
            sleep_after_last: false,
        }
    }
}

/// One validated environment overlay entry
///
/// Entries keep their declaration order; duplicate keys are permitted and
/// the later entry wins at injection time (with a warning).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSetting {
    pub key: String,
    pub value: String,
}

impl EnvSetting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Attempt accounting and sleep placement policy
///
/// The canonical behavior is "max_retries counts total attempts, no sleep
/// after the final attempt". The historical alternatives stay available
/// as explicit knobs rather than a silent semantic change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub retries_exclude_first: bool,
    pub sleep_after_last: bool,
}

impl Pacing {
    /// Total attempts granted by the budget under this accounting
    pub fn total_attempts(&self, max_retries: u32) -> u32 {
        if self.retries_exclude_first {
            max_retries.saturating_add(1)
        } else {
            max_retries
        }
    }
}

/// Fully-validated configuration for one wait operation
///
/// Immutable once built; owned by the engine for the duration of one
/// convergence pass.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    pub condition: Condition,
    pub query: Option<String>,
    pub environment: Vec<EnvSetting>,
    /// None = unbounded
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub polling_frequency: Duration,
    pub refresh_only: bool,
    pub pacing: Pacing,
}
