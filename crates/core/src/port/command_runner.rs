// Command Runner Port
// Abstraction for one bounded execution of the query command

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::EnvSetting;

/// Captured result of one query execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// stdout and stderr combined into one stream
    pub output: String,
    pub exit_code: i32,
}

/// Command execution errors
///
/// NotFound and TimedOut abort a convergence pass without consuming the
/// remaining retry budget; a missing command or a hard timeout is a
/// configuration problem, not a transient condition.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found (exit status 127): {0}")]
    NotFound(String),

    #[error("Command timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellRunner (infra-system): spawns through a shell so metacharacters
///   behave as in a shell session
/// - mocks::MockCommandRunner: scripted results for deterministic tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command once with the environment overlay applied
    ///
    /// The overlay is layered on top of the inherited environment and
    /// passed to the spawned process only; the ambient process environment
    /// is never mutated.
    ///
    /// # Errors
    /// - CommandError::NotFound if the shell reports exit status 127
    /// - CommandError::TimedOut if execution exceeds `timeout`
    /// - CommandError::SpawnFailed if the shell cannot be started
    async fn run(
        &self,
        command: &str,
        environment: &[EnvSetting],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One scripted observation
    #[derive(Debug, Clone)]
    pub enum ScriptedRun {
        /// Return this combined output and exit status
        Observed { output: String, exit_code: i32 },
        /// Fail as a missing command
        NotFound,
        /// Fail as a timed-out command
        TimedOut(Duration),
    }

    /// Mock Command Runner for testing
    ///
    /// Plays back a script of results; once the script is empty the last
    /// entry repeats. Records every call for attempt-count assertions.
    pub struct MockCommandRunner {
        script: Arc<Mutex<VecDeque<ScriptedRun>>>,
        repeat: Arc<Mutex<Option<ScriptedRun>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCommandRunner {
        pub fn new(script: Vec<ScriptedRun>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                repeat: Arc::new(Mutex::new(None)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every call observes the same output and exit status
        pub fn new_fixed(output: impl Into<String>, exit_code: i32) -> Self {
            Self::new(vec![ScriptedRun::Observed {
                output: output.into(),
                exit_code,
            }])
        }

        pub fn new_not_found() -> Self {
            Self::new(vec![ScriptedRun::NotFound])
        }

        pub fn new_timed_out(after: Duration) -> Self {
            Self::new(vec![ScriptedRun::TimedOut(after)])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Commands the engine actually ran, in order
        pub fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(
            &self,
            command: &str,
            _environment: &[EnvSetting],
            _timeout: Option<Duration>,
        ) -> Result<CommandOutput, CommandError> {
            self.calls.lock().unwrap().push(command.to_string());

            let next = {
                let mut script = self.script.lock().unwrap();
                match script.pop_front() {
                    Some(entry) => {
                        *self.repeat.lock().unwrap() = Some(entry.clone());
                        entry
                    }
                    None => self
                        .repeat
                        .lock()
                        .unwrap()
                        .clone()
                        .expect("mock script is empty"),
                }
            };

            match next {
                ScriptedRun::Observed { output, exit_code } => {
                    Ok(CommandOutput { output, exit_code })
                }
                ScriptedRun::NotFound => Err(CommandError::NotFound("sh: not found".to_string())),
                ScriptedRun::TimedOut(after) => Err(CommandError::TimedOut(after)),
            }
        }
    }
}
