// Shell runner implementation
// reason: async-trait, tokio for async process management (ADR-001)
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use vigil_core::application::constants::GRACEFUL_KILL_TIMEOUT_MS;
use vigil_core::domain::EnvSetting;
use vigil_core::port::{Clock, CommandError, CommandOutput, CommandRunner};

/// Exit status a POSIX shell reports when the command cannot be found
const SHELL_NOT_FOUND_STATUS: i32 = 127;

/// Shell runner
///
/// Spawns the query through a shell so metacharacters behave as in a
/// shell session. The environment overlay is passed to the spawned
/// process only; the ambient process environment is never mutated, so
/// concurrent unrelated waits cannot race on it.
pub struct ShellRunner {
    clock: Arc<dyn Clock>,
}

impl ShellRunner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Merge the ordered overlay into one map; later entries win and the
    /// override is warned about, matching the historical diagnostics
    fn merge_overlay(environment: &[EnvSetting]) -> HashMap<String, String> {
        let mut merged = HashMap::new();
        for setting in environment {
            if let Some(previous) = merged.insert(setting.key.clone(), setting.value.clone()) {
                warn!(
                    key = %setting.key,
                    value = %setting.value,
                    previous = %previous,
                    "Overriding environment setting"
                );
            }
        }
        merged
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(unix)]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }

        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
    }

    async fn spawn_and_wait(
        &self,
        command: &str,
        environment: &[EnvSetting],
        limit: Option<Duration>,
    ) -> Result<std::process::Output, CommandError> {
        let merged = Self::merge_overlay(environment);

        let mut cmd = Self::shell_command(command);
        cmd.envs(&merged)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| CommandError::SpawnFailed(e.to_string()))?;
        let pid = child.id();

        match limit {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(CommandError::Io(e.to_string())),
                Err(_) => {
                    if let Some(pid) = pid {
                        self.kill_graceful(pid as i32).await;
                    }
                    Err(CommandError::TimedOut(limit))
                }
            },
            None => child
                .wait_with_output()
                .await
                .map_err(|e| CommandError::Io(e.to_string())),
        }
    }

    /// Kill a timed-out query with SIGTERM first, then SIGKILL (ADR-002)
    ///
    /// The run is already failing with TimedOut at this point, so kill
    /// problems are logged rather than propagated.
    #[cfg(unix)]
    async fn kill_graceful(&self, pid: i32) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        debug!(pid = %pid, "Sending SIGTERM to timed-out query");
        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
            warn!(pid = %pid, error = %e, "SIGTERM failed");
            return;
        }

        let start_time = self.clock.now_millis();
        loop {
            self.clock.pause(Duration::from_millis(100)).await;

            // Signal 0 checks whether the process still exists
            if kill(Pid::from_raw(pid), None).is_err() {
                debug!(pid = %pid, "Query exited after SIGTERM");
                return;
            }

            if self.clock.now_millis() - start_time > GRACEFUL_KILL_TIMEOUT_MS {
                warn!(pid = %pid, "Query did not exit after SIGTERM, sending SIGKILL");
                if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGKILL) {
                    warn!(pid = %pid, error = %e, "SIGKILL failed");
                }
                return;
            }
        }
    }

    #[cfg(windows)]
    async fn kill_graceful(&self, pid: i32) {
        use std::process::Command;

        debug!(pid = %pid, "Killing timed-out query on Windows");
        let output = Command::new("taskkill")
            .args(["/F", "/PID", &pid.to_string()])
            .output();

        match output {
            Ok(output) if !output.status.success() => {
                warn!(
                    pid = %pid,
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "taskkill failed"
                );
            }
            Err(e) => warn!(pid = %pid, error = %e, "taskkill failed"),
            _ => {}
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        environment: &[EnvSetting],
        limit: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        debug!(
            command = %command,
            timeout = ?limit,
            overlay_entries = environment.len(),
            "Running query"
        );

        let output = self.spawn_and_wait(command, environment, limit).await?;

        let exit_code = output
            .status
            .code()
            .ok_or_else(|| CommandError::Io("query terminated by signal".to_string()))?;

        // stdout and stderr combined into one stream
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        // The shell returns 127 if the command is missing; that is a
        // configuration problem, not an observation
        if exit_code == SHELL_NOT_FOUND_STATUS {
            return Err(CommandError::NotFound(combined));
        }

        debug!(command = %command, exit_code = exit_code, "Query completed");

        Ok(CommandOutput {
            output: combined,
            exit_code,
        })
    }
}
