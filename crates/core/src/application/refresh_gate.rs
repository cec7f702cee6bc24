// Refresh Gate
// Decides whether a convergence pass should run at all on this invocation.

use tracing::debug;

use crate::domain::WaitSpec;

/// Should the poll loop run on this invocation?
///
/// A refresh-only wait reports itself as already satisfied on routine
/// evaluations, so a generic "are all preconditions met" check skips it;
/// only a dependency-triggered refresh makes it the actual work to do.
pub fn should_run(spec: &WaitSpec, triggered_by_refresh: bool) -> bool {
    if !spec.refresh_only {
        return true;
    }
    if !triggered_by_refresh {
        debug!(
            condition = spec.condition.kind(),
            "Refresh-only wait outside a refresh pass, treating as satisfied"
        );
    }
    triggered_by_refresh
}
