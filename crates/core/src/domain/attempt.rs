// Attempt Domain Model

/// Transient record of one loop iteration
///
/// Attempts are not retained beyond the loop; only the last one survives,
/// for the exhausted report.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// 1-based attempt index
    pub index: u32,
    /// Combined stdout+stderr of the query, when one ran
    pub output: Option<String>,
    /// Exit status of the query, when one ran
    pub exit_code: Option<i32>,
    /// Wall time spent observing, in milliseconds
    pub elapsed_ms: i64,
    /// Whether the condition held for this observation
    pub matched: bool,
}

impl Attempt {
    /// Truncated output suitable for a log field or a report line
    pub fn display_output(&self, limit: usize) -> Option<String> {
        self.output.as_ref().map(|out| {
            let trimmed = out.trim_end();
            if trimmed.chars().count() <= limit {
                trimmed.to_string()
            } else {
                let cut: String = trimmed.chars().take(limit).collect();
                format!("{cut}...")
            }
        })
    }
}
