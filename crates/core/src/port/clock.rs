// Clock Port (for testability)
// Owns both wall time and pacing sleeps so tests can count and skip them

use async_trait::async_trait;
use std::time::Duration;

/// Clock interface (allows mocking in tests)
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Block the current task for `duration`
    async fn pause(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Manual clock for deterministic tests
    ///
    /// `pause` returns immediately, records the requested duration and
    /// advances the reported time by it.
    pub struct ManualClock {
        now_millis: Arc<Mutex<i64>>,
        pauses: Arc<Mutex<Vec<Duration>>>,
    }

    impl ManualClock {
        pub fn new(start_millis: i64) -> Self {
            Self {
                now_millis: Arc::new(Mutex::new(start_millis)),
                pauses: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every pause the engine requested, in order
        pub fn pauses(&self) -> Vec<Duration> {
            self.pauses.lock().unwrap().clone()
        }

        pub fn pause_count(&self) -> usize {
            self.pauses.lock().unwrap().len()
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(1_000_000)
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            *self.now_millis.lock().unwrap()
        }

        async fn pause(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
            *self.now_millis.lock().unwrap() += duration.as_millis() as i64;
        }
    }
}
