// Outcome Domain Model

use std::time::Duration;

use crate::domain::Attempt;

/// Value reported on a satisfied condition
#[derive(Debug, Clone, PartialEq)]
pub enum MatchValue {
    /// The exit status that was a member of the expected set
    ExitCode(i32),
    /// The pattern the output matched
    Pattern(String),
    /// The fixed duration that was waited
    Elapsed(Duration),
    /// The filesystem state the path reached
    PathState(crate::domain::PathExpectation),
}

impl std::fmt::Display for MatchValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchValue::ExitCode(code) => write!(f, "exit status {code}"),
            MatchValue::Pattern(pattern) => write!(f, "output matched {pattern:?}"),
            MatchValue::Elapsed(duration) => write!(f, "waited {}s", duration.as_secs_f64()),
            MatchValue::PathState(want) => write!(f, "path is {want}"),
        }
    }
}

/// Final result of one convergence pass
///
/// Aborts (configuration errors, missing command, timeout) are the `Err`
/// arm of the engine's `Result<Outcome, WaitError>`, not an Outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The condition held; carries the matcher's value
    Satisfied(MatchValue),
    /// Refresh gate declined the run; nothing was executed
    AlreadySatisfied,
    /// The retry budget was consumed without the condition ever holding
    Exhausted(ExhaustedReport),
}

impl Outcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Outcome::Satisfied(_) | Outcome::AlreadySatisfied)
    }
}

/// Human-readable summary of an exhausted retry budget
#[derive(Debug, Clone)]
pub struct ExhaustedReport {
    /// Condition tag ("exit_code", "regex", "path")
    pub condition_kind: &'static str,
    /// Condition-specific clause, e.g. "exit status still 1"
    pub detail: String,
    /// Attempts actually made
    pub attempts: u32,
    pub polling_frequency: Duration,
    /// The final observation, kept for diagnostics
    pub last_attempt: Option<Attempt>,
}

impl std::fmt::Display for ExhaustedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} after {} attempts (polling frequency: {}s)",
            self.detail,
            self.attempts,
            self.polling_frequency.as_secs_f64()
        )
    }
}
