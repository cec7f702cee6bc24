// Domain Layer - Pure business logic and entities

pub mod attempt;
pub mod condition;
pub mod error;
pub mod outcome;
pub mod wait_spec;

// Re-exports
pub use attempt::Attempt;
pub use condition::{Condition, PathExpectation, PathState};
pub use error::ConfigError;
pub use outcome::{ExhaustedReport, MatchValue, Outcome};
pub use wait_spec::{EnvSetting, Pacing, WaitParams, WaitSpec};
