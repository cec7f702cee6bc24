// Engine constants (ADR: No magic values)

/// Maximum characters of captured output shown in log fields and reports
pub const OUTPUT_DISPLAY_LIMIT: usize = 200;

/// Graceful process kill timeout after SIGTERM (5 seconds)
/// Used by ShellRunner when a query exceeds its execution timeout
pub const GRACEFUL_KILL_TIMEOUT_MS: i64 = 5000;
