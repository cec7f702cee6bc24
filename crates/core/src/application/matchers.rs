// Condition Matchers
// Pure evaluators, one per condition tag. Each decides from the latest
// observation whether the condition holds and which value to report.

use std::collections::BTreeSet;

use regex::Regex;

use crate::domain::{MatchValue, PathExpectation, PathState};

/// Exit-code matcher: set membership over the latest exit status
pub fn exit_code(expected: &BTreeSet<i32>, observed: i32) -> Option<MatchValue> {
    expected
        .contains(&observed)
        .then_some(MatchValue::ExitCode(observed))
}

/// Output matcher: the pattern occurs anywhere in the combined output of
/// the single most recent attempt (no anchoring, no cross-attempt state)
pub fn output(pattern: &Regex, combined: &str) -> Option<MatchValue> {
    pattern
        .is_match(combined)
        .then(|| MatchValue::Pattern(pattern.as_str().to_string()))
}

/// Path matcher: the observed filesystem state satisfies the wanted one
pub fn path(want: PathExpectation, state: PathState) -> Option<MatchValue> {
    let satisfied = match want {
        PathExpectation::Absent => !state.exists(),
        PathExpectation::Present => state.exists(),
        PathExpectation::File => state == PathState::File,
        PathExpectation::Directory => state == PathState::Directory,
    };
    satisfied.then_some(MatchValue::PathState(want))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_set_membership() {
        let expected = BTreeSet::from([0, 2]);
        assert_eq!(exit_code(&expected, 0), Some(MatchValue::ExitCode(0)));
        assert_eq!(exit_code(&expected, 2), Some(MatchValue::ExitCode(2)));
        assert_eq!(exit_code(&expected, 1), None);
    }

    #[test]
    fn test_output_substring_semantics() {
        let pattern = Regex::new("oo b").unwrap();
        assert!(output(&pattern, "foo bar\n").is_some());
        assert!(output(&pattern, "baz\n").is_none());
    }

    #[test]
    fn test_output_no_anchoring() {
        let pattern = Regex::new("bar").unwrap();
        assert_eq!(
            output(&pattern, "prefix bar suffix"),
            Some(MatchValue::Pattern("bar".to_string()))
        );
    }

    #[test]
    fn test_path_absent() {
        assert!(path(PathExpectation::Absent, PathState::Missing).is_some());
        assert!(path(PathExpectation::Absent, PathState::File).is_none());
    }

    #[test]
    fn test_path_present_any_type() {
        assert!(path(PathExpectation::Present, PathState::File).is_some());
        assert!(path(PathExpectation::Present, PathState::Directory).is_some());
        assert!(path(PathExpectation::Present, PathState::Other).is_some());
        assert!(path(PathExpectation::Present, PathState::Missing).is_none());
    }

    #[test]
    fn test_path_file_and_directory_are_exact() {
        assert!(path(PathExpectation::File, PathState::File).is_some());
        assert!(path(PathExpectation::File, PathState::Directory).is_none());
        assert!(path(PathExpectation::Directory, PathState::Directory).is_some());
        assert!(path(PathExpectation::Directory, PathState::Other).is_none());
    }
}
