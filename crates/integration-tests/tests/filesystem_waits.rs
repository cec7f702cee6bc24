// Filesystem-state waits against the real filesystem

use std::sync::Arc;
use std::time::Duration;

use vigil_core::application::{validate, ConvergenceEngine};
use vigil_core::domain::{Outcome, WaitParams};
use vigil_core::port::SystemClock;
use vigil_infra_system::{ShellRunner, SystemPathProbe};

fn engine() -> ConvergenceEngine {
    let clock = Arc::new(SystemClock);
    ConvergenceEngine::new(
        Arc::new(ShellRunner::new(clock.clone())),
        Arc::new(SystemPathProbe),
        clock,
    )
}

fn path_params(path: &std::path::Path, want: &str) -> WaitParams {
    WaitParams {
        path: Some(path.to_string_lossy().into_owned()),
        want: Some(want.to_string()),
        max_retries: 100,
        polling_frequency: 0.02,
        ..WaitParams::default()
    }
}

#[tokio::test]
async fn test_absent_is_satisfied_immediately_for_missing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("never-created");

    let spec = validate(path_params(&gone, "absent")).unwrap();
    let outcome = engine().converge(&spec, false).await.unwrap();
    assert!(outcome.is_satisfied());
}

#[tokio::test]
async fn test_waits_until_file_appears() {
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("ready");

    let flag_writer = flag.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        std::fs::write(&flag_writer, b"up").unwrap();
    });

    let spec = validate(path_params(&flag, "file")).unwrap();
    let outcome = engine().converge(&spec, false).await.unwrap();

    assert!(outcome.is_satisfied());
    writer.await.unwrap();
}

#[tokio::test]
async fn test_waits_until_entry_disappears() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("old.pid");
    std::fs::write(&pidfile, b"1234").unwrap();

    let pidfile_remover = pidfile.clone();
    let remover = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        std::fs::remove_file(&pidfile_remover).unwrap();
    });

    let spec = validate(path_params(&pidfile, "absent")).unwrap();
    let outcome = engine().converge(&spec, false).await.unwrap();

    assert!(outcome.is_satisfied());
    remover.await.unwrap();
}

#[tokio::test]
async fn test_directory_want_is_not_satisfied_by_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    std::fs::write(&file, b"x").unwrap();

    let mut params = path_params(&file, "directory");
    params.max_retries = 2;
    params.polling_frequency = 0.0;

    let spec = validate(params).unwrap();
    match engine().converge(&spec, false).await.unwrap() {
        Outcome::Exhausted(report) => {
            assert!(
                report.detail.contains("still not directory"),
                "detail was: {}",
                report.detail
            );
        }
        other => panic!("expected exhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_present_accepts_a_directory() {
    let dir = tempfile::tempdir().unwrap();

    let mut params = path_params(dir.path(), "present");
    params.max_retries = 1;

    let spec = validate(params).unwrap();
    let outcome = engine().converge(&spec, false).await.unwrap();
    assert!(outcome.is_satisfied());
}
