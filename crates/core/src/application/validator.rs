// Parameter Validator
// Rejects structurally invalid parameter combinations before the loop
// ever starts. All failures are ConfigError, never silently coerced.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::domain::error::Result;
use crate::domain::{
    Condition, ConfigError, EnvSetting, Pacing, PathExpectation, WaitParams, WaitSpec,
};

// Same shape the original environment parameter accepted: a word key,
// an equals sign, and a value that may contain anything including newlines.
static ENV_SETTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\w+)=(.*)$").expect("static env pattern"));

/// Validate a raw parameter document into an immutable WaitSpec
pub fn validate(params: WaitParams) -> Result<WaitSpec> {
    let condition = build_condition(&params)?;
    check_query_consistency(&params, &condition)?;

    let environment = parse_environment(&params.environment)?;

    if params.max_retries < 1 {
        return Err(ConfigError::InvalidMaxRetries(params.max_retries));
    }
    if params.polling_frequency < 0.0 {
        return Err(ConfigError::NegativePollingFrequency(
            params.polling_frequency,
        ));
    }
    if params.timeout < 0.0 {
        return Err(ConfigError::NegativeTimeout(params.timeout));
    }

    let timeout = if params.timeout == 0.0 {
        None
    } else {
        Some(Duration::from_secs_f64(params.timeout))
    };

    Ok(WaitSpec {
        condition,
        query: params.query,
        environment,
        timeout,
        max_retries: params.max_retries,
        polling_frequency: Duration::from_secs_f64(params.polling_frequency),
        refresh_only: params.refresh_only,
        pacing: Pacing {
            retries_exclude_first: params.retries_exclude_first,
            sleep_after_last: params.sleep_after_last,
        },
    })
}

/// Pick the single condition the parameters describe
fn build_condition(params: &WaitParams) -> Result<Condition> {
    if params.want.is_some() && params.path.is_none() {
        return Err(ConfigError::PathMissing);
    }

    let mut given: Vec<&'static str> = Vec::new();
    if params.exit_code.is_some() {
        given.push("exit_code");
    }
    if params.regex.is_some() {
        given.push("regex");
    }
    if params.seconds.is_some() {
        given.push("seconds");
    }
    if params.path.is_some() {
        given.push("path");
    }

    match given.as_slice() {
        [] => return Err(ConfigError::NoConditionGiven),
        [_] => {}
        many => return Err(ConfigError::ConflictingConditions(many.join(", "))),
    }

    if let Some(codes) = &params.exit_code {
        if codes.is_empty() {
            return Err(ConfigError::EmptyExitCodeSet);
        }
        return Ok(Condition::ExitCode(BTreeSet::from_iter(
            codes.iter().copied(),
        )));
    }

    if let Some(pattern) = &params.regex {
        let compiled = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        return Ok(Condition::Pattern(compiled));
    }

    if let Some(seconds) = params.seconds {
        if seconds < 0.0 {
            return Err(ConfigError::NegativeSeconds(seconds));
        }
        return Ok(Condition::FixedDuration(Duration::from_secs_f64(seconds)));
    }

    // only the path member can still be populated at this point
    let path = params.path.as_ref().ok_or(ConfigError::NoConditionGiven)?;
    let want = params.want.as_deref().ok_or(ConfigError::WantMissing)?;
    Ok(Condition::FilesystemState {
        path: PathBuf::from(path),
        want: want.parse::<PathExpectation>()?,
    })
}

/// Query presence must be consistent with the condition kind
fn check_query_consistency(params: &WaitParams, condition: &Condition) -> Result<()> {
    match (condition.needs_query(), params.query.is_some()) {
        (true, false) => Err(ConfigError::QueryRequired(condition.kind())),
        (false, true) => Err(ConfigError::QueryForbidden(condition.kind())),
        _ => Ok(()),
    }
}

/// Split "key=value" entries, preserving order and duplicates
fn parse_environment(entries: &[String]) -> Result<Vec<EnvSetting>> {
    entries
        .iter()
        .map(|entry| match ENV_SETTING.captures(entry) {
            Some(caps) => Ok(EnvSetting::new(&caps[1], &caps[2])),
            None => Err(ConfigError::MalformedEnvSetting(entry.clone())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex_params() -> WaitParams {
        WaitParams {
            query: Some("echo foo bar".to_string()),
            regex: Some("foo".to_string()),
            ..WaitParams::default()
        }
    }

    #[test]
    fn test_accepts_minimal_regex_spec() {
        let spec = validate(regex_params()).unwrap();
        assert!(matches!(spec.condition, Condition::Pattern(_)));
        assert_eq!(spec.max_retries, 119);
        assert_eq!(spec.polling_frequency, Duration::from_millis(500));
        assert!(spec.timeout.is_none());
    }

    #[test]
    fn test_rejects_missing_condition() {
        let params = WaitParams {
            query: Some("echo foo bar".to_string()),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::NoConditionGiven)
        ));
    }

    #[test]
    fn test_rejects_conflicting_conditions() {
        let params = WaitParams {
            exit_code: Some(vec![42]),
            ..regex_params()
        };
        match validate(params) {
            Err(ConfigError::ConflictingConditions(given)) => {
                assert!(given.contains("exit_code"));
                assert!(given.contains("regex"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_three_conditions() {
        let params = WaitParams {
            exit_code: Some(vec![42]),
            seconds: Some(42.0),
            ..regex_params()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::ConflictingConditions(_))
        ));
    }

    #[test]
    fn test_rejects_query_with_path_condition() {
        let params = WaitParams {
            query: Some("echo foo bar".to_string()),
            path: Some("/var/run/ready".to_string()),
            want: Some("present".to_string()),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::QueryForbidden("path"))
        ));
    }

    #[test]
    fn test_rejects_query_with_seconds_condition() {
        let params = WaitParams {
            query: Some("echo foo bar".to_string()),
            seconds: Some(1.0),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::QueryForbidden("seconds"))
        ));
    }

    #[test]
    fn test_rejects_missing_query_for_exit_code() {
        let params = WaitParams {
            exit_code: Some(vec![0]),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::QueryRequired("exit_code"))
        ));
    }

    #[test]
    fn test_rejects_path_without_want() {
        let params = WaitParams {
            path: Some("/var/run/ready".to_string()),
            ..WaitParams::default()
        };
        assert!(matches!(validate(params), Err(ConfigError::WantMissing)));
    }

    #[test]
    fn test_rejects_want_without_path() {
        let params = WaitParams {
            want: Some("present".to_string()),
            ..WaitParams::default()
        };
        assert!(matches!(validate(params), Err(ConfigError::PathMissing)));
    }

    #[test]
    fn test_rejects_unknown_want() {
        let params = WaitParams {
            path: Some("/var/run/ready".to_string()),
            want: Some("sticky".to_string()),
            ..WaitParams::default()
        };
        assert!(matches!(validate(params), Err(ConfigError::UnknownWant(_))));
    }

    #[test]
    fn test_rejects_empty_exit_code_set() {
        let params = WaitParams {
            query: Some("true".to_string()),
            exit_code: Some(vec![]),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::EmptyExitCodeSet)
        ));
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        let params = WaitParams {
            regex: Some("(unclosed".to_string()),
            ..regex_params()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_max_retries() {
        let params = WaitParams {
            max_retries: 0,
            ..regex_params()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::InvalidMaxRetries(0))
        ));
    }

    #[test]
    fn test_rejects_negative_polling_frequency() {
        let params = WaitParams {
            polling_frequency: -1.0,
            ..regex_params()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::NegativePollingFrequency(_))
        ));
    }

    #[test]
    fn test_rejects_negative_timeout() {
        let params = WaitParams {
            timeout: -0.1,
            ..regex_params()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::NegativeTimeout(_))
        ));
    }

    #[test]
    fn test_rejects_negative_seconds() {
        let params = WaitParams {
            seconds: Some(-1.0),
            ..WaitParams::default()
        };
        assert!(matches!(
            validate(params),
            Err(ConfigError::NegativeSeconds(_))
        ));
    }

    #[test]
    fn test_rejects_env_entry_without_equals() {
        let params = WaitParams {
            environment: vec!["FOO".to_string()],
            ..regex_params()
        };
        match validate(params) {
            Err(ConfigError::MalformedEnvSetting(entry)) => assert_eq!(entry, "FOO"),
            other => panic!("expected malformed env entry, got {other:?}"),
        }
    }

    #[test]
    fn test_env_entries_keep_order_and_duplicates() {
        let params = WaitParams {
            environment: vec![
                "FOO=1".to_string(),
                "BAR=two".to_string(),
                "FOO=3".to_string(),
            ],
            ..regex_params()
        };
        let spec = validate(params).unwrap();
        assert_eq!(
            spec.environment,
            vec![
                EnvSetting::new("FOO", "1"),
                EnvSetting::new("BAR", "two"),
                EnvSetting::new("FOO", "3"),
            ]
        );
    }

    #[test]
    fn test_env_value_may_contain_equals_and_newlines() {
        let params = WaitParams {
            environment: vec!["FOO=a=b\nc".to_string()],
            ..regex_params()
        };
        let spec = validate(params).unwrap();
        assert_eq!(spec.environment, vec![EnvSetting::new("FOO", "a=b\nc")]);
    }

    #[test]
    fn test_timeout_zero_means_unbounded() {
        let spec = validate(regex_params()).unwrap();
        assert!(spec.timeout.is_none());

        let params = WaitParams {
            timeout: 2.5,
            ..regex_params()
        };
        let spec = validate(params).unwrap();
        assert_eq!(spec.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_exit_code_set_membership_preserved() {
        let params = WaitParams {
            query: Some("true".to_string()),
            exit_code: Some(vec![2, 0, 2]),
            ..WaitParams::default()
        };
        let spec = validate(params).unwrap();
        match spec.condition {
            Condition::ExitCode(set) => {
                assert_eq!(set, BTreeSet::from([0, 2]));
            }
            other => panic!("expected exit code condition, got {other:?}"),
        }
    }
}
