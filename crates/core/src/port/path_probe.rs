// Path Probe Port
// Filesystem stat behind an interface so path conditions stay testable

use std::path::Path;

use crate::domain::PathState;

/// Path probe port
///
/// One fresh stat per call; the engine never caches a prior observation,
/// so toggling the entry between attempts changes the next poll.
pub trait PathProbe: Send + Sync {
    /// Classify the filesystem entry at `path`
    fn probe(&self, path: &Path) -> PathState;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock PathProbe for testing
    ///
    /// Plays back a sequence of states; the last one repeats.
    pub struct MockPathProbe {
        states: Arc<Mutex<VecDeque<PathState>>>,
        last: Arc<Mutex<Option<PathState>>>,
        probe_count: Arc<Mutex<usize>>,
    }

    impl MockPathProbe {
        pub fn new(states: Vec<PathState>) -> Self {
            Self {
                states: Arc::new(Mutex::new(states.into())),
                last: Arc::new(Mutex::new(None)),
                probe_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_fixed(state: PathState) -> Self {
            Self::new(vec![state])
        }

        pub fn probe_count(&self) -> usize {
            *self.probe_count.lock().unwrap()
        }
    }

    impl PathProbe for MockPathProbe {
        fn probe(&self, _path: &Path) -> PathState {
            *self.probe_count.lock().unwrap() += 1;

            let mut states = self.states.lock().unwrap();
            match states.pop_front() {
                Some(state) => {
                    *self.last.lock().unwrap() = Some(state);
                    state
                }
                None => self.last.lock().unwrap().expect("mock states are empty"),
            }
        }
    }
}
