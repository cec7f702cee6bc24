// Convergence Engine - The poll/retry loop
// Drives the command runner and the chosen matcher across a bounded
// number of attempts: Idle -> Attempting -> {Satisfied, Exhausted, Aborted}

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::constants::OUTPUT_DISPLAY_LIMIT;
use crate::application::{matchers, refresh_gate};
use crate::domain::{
    Attempt, Condition, ExhaustedReport, MatchValue, Outcome, WaitSpec,
};
use crate::error::{Result, WaitError};
use crate::port::{Clock, CommandOutput, CommandRunner, PathProbe};

/// The single entry point of the wait engine
///
/// Strictly sequential and single-threaded: one query execution and one
/// sleep happen at a time, and attempt i+1 never starts before attempt i
/// has fully completed, including its sleep.
pub struct ConvergenceEngine {
    command_runner: Arc<dyn CommandRunner>,
    path_probe: Arc<dyn PathProbe>,
    clock: Arc<dyn Clock>,
}

impl ConvergenceEngine {
    pub fn new(
        command_runner: Arc<dyn CommandRunner>,
        path_probe: Arc<dyn PathProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            command_runner,
            path_probe,
            clock,
        }
    }

    /// Would this spec currently be considered satisfied without running
    /// anything? Used by hosts for idempotence/no-op reporting.
    pub fn is_already_satisfied(&self, spec: &WaitSpec, triggered_by_refresh: bool) -> bool {
        !refresh_gate::should_run(spec, triggered_by_refresh)
    }

    /// Run one convergence pass
    ///
    /// # Errors
    /// - WaitError::Command for a missing command, a timed-out execution
    ///   or a spawn failure; none of these consume remaining attempts
    pub async fn converge(
        &self,
        spec: &WaitSpec,
        triggered_by_refresh: bool,
    ) -> Result<Outcome> {
        if !refresh_gate::should_run(spec, triggered_by_refresh) {
            info!(
                condition = spec.condition.kind(),
                "Nothing to do: refresh-only wait outside a refresh pass"
            );
            return Ok(Outcome::AlreadySatisfied);
        }

        // A fixed duration runs exactly once; retries and polling
        // frequency are not applicable.
        if let Condition::FixedDuration(duration) = &spec.condition {
            info!(seconds = duration.as_secs_f64(), "Waiting for fixed duration");
            self.clock.pause(*duration).await;
            return Ok(Outcome::Satisfied(MatchValue::Elapsed(*duration)));
        }

        self.poll(spec).await
    }

    async fn poll(&self, spec: &WaitSpec) -> Result<Outcome> {
        let attempts = spec.pacing.total_attempts(spec.max_retries);

        info!(
            condition = spec.condition.kind(),
            query = spec.query.as_deref().unwrap_or(""),
            max_retries = spec.max_retries,
            polling_frequency = spec.polling_frequency.as_secs_f64(),
            "Waiting until the condition holds"
        );

        let mut last_attempt: Option<Attempt> = None;

        for index in 1..=attempts {
            debug!(attempt = index, "Attempt");

            let (attempt, value) = self.observe(spec, index).await?;

            if let Some(value) = value {
                info!(
                    attempt = index,
                    value = %value,
                    "Condition satisfied"
                );
                return Ok(Outcome::Satisfied(value));
            }

            last_attempt = Some(attempt);

            let is_last = index == attempts;
            if (!is_last || spec.pacing.sleep_after_last)
                && spec.polling_frequency > std::time::Duration::ZERO
            {
                debug!(
                    seconds = spec.polling_frequency.as_secs_f64(),
                    "Sleeping before next attempt"
                );
                self.clock.pause(spec.polling_frequency).await;
            }
        }

        let report = ExhaustedReport {
            condition_kind: spec.condition.kind(),
            detail: exhausted_detail(spec, last_attempt.as_ref()),
            attempts,
            polling_frequency: spec.polling_frequency,
            last_attempt,
        };
        warn!(report = %report, "Retry budget exhausted");
        Ok(Outcome::Exhausted(report))
    }

    /// Make one observation and evaluate the matching evaluator
    async fn observe(&self, spec: &WaitSpec, index: u32) -> Result<(Attempt, Option<MatchValue>)> {
        let started = self.clock.now_millis();

        let (output, exit_code, value) = match &spec.condition {
            Condition::ExitCode(expected) => {
                let observed = self.run_query(spec).await?;
                let value = matchers::exit_code(expected, observed.exit_code);
                if value.is_none() {
                    debug!(
                        exit_code = observed.exit_code,
                        expected = ?expected,
                        "Exit status not in the expected set"
                    );
                }
                (Some(observed.output), Some(observed.exit_code), value)
            }
            Condition::Pattern(pattern) => {
                let observed = self.run_query(spec).await?;
                let value = matchers::output(pattern, &observed.output);
                if value.is_none() {
                    debug!(
                        pattern = pattern.as_str(),
                        "Query output did not match the pattern"
                    );
                }
                (Some(observed.output), Some(observed.exit_code), value)
            }
            Condition::FilesystemState { path, want } => {
                let state = self.path_probe.probe(path);
                let value = matchers::path(*want, state);
                if value.is_none() {
                    debug!(
                        path = %path.display(),
                        state = ?state,
                        want = %want,
                        "Path not in the wanted state"
                    );
                }
                (None, None, value)
            }
            Condition::FixedDuration(_) => {
                return Err(WaitError::Internal(
                    "fixed duration does not enter the poll loop".to_string(),
                ))
            }
        };

        let attempt = Attempt {
            index,
            output,
            exit_code,
            elapsed_ms: self.clock.now_millis() - started,
            matched: value.is_some(),
        };

        if let Some(shown) = attempt.display_output(OUTPUT_DISPLAY_LIMIT) {
            debug!(
                attempt = index,
                exit_code = ?attempt.exit_code,
                output = %shown,
                elapsed_ms = attempt.elapsed_ms,
                "Observation"
            );
        }

        Ok((attempt, value))
    }

    async fn run_query(&self, spec: &WaitSpec) -> Result<CommandOutput> {
        let query = spec
            .query
            .as_deref()
            .ok_or_else(|| WaitError::Internal("query missing for command condition".to_string()))?;

        let observed = self
            .command_runner
            .run(query, &spec.environment, spec.timeout)
            .await?;
        Ok(observed)
    }
}

/// Condition-specific clause for the exhausted report
fn exhausted_detail(spec: &WaitSpec, last_attempt: Option<&Attempt>) -> String {
    match &spec.condition {
        Condition::ExitCode(expected) => match last_attempt.and_then(|a| a.exit_code) {
            Some(code) => format!("exit status still {code}"),
            None => format!("exit status never in {expected:?}"),
        },
        Condition::Pattern(pattern) => {
            format!("output never matched {:?}", pattern.as_str())
        }
        Condition::FilesystemState { path, want } => {
            format!("{} still not {}", path.display(), want)
        }
        Condition::FixedDuration(_) => "wait not performed".to_string(),
    }
}
