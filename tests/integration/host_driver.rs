//! Integration tests for driving a full startup

use super::test_utils::{recording_parts, EventLog};
use stagecoach::context::{BackingStore, SledBackingStore};
use stagecoach::driver::drive_startup;
use stagecoach::error::DriverError;
use stagecoach::run_loop::QueuedRunLoop;
use stagecoach::{LifecycleCoordinator, Phase, StartupParameters};
use std::cell::Cell;
use std::rc::Rc;
use tempfile::TempDir;

/// Test that test-harness mode leaves the loop to the harness
#[test]
fn test_harness_mode_skips_run_loop() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));
    let mut run_loop = QueuedRunLoop::new();
    run_loop.post(|| Ok(()));

    let report = drive_startup(&mut coordinator, &mut run_loop).unwrap();
    assert!(!report.ran_main_loop);
    assert_eq!(report.phases, Phase::ALL.to_vec());
    assert_eq!(run_loop.pending(), 1);
}

/// Test that interactive mode runs the loop between main execution and post run
#[test]
fn test_interactive_mode_runs_loop() {
    let params = StartupParameters {
        test_harness: false,
        ..StartupParameters::for_test_harness()
    };
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));

    let ran = Rc::new(Cell::new(false));
    let mut run_loop = QueuedRunLoop::new();
    {
        let ran = ran.clone();
        let log = log.clone();
        run_loop.post(move || {
            log.push("loop:task");
            ran.set(true);
            Ok(())
        });
    }

    let report = drive_startup(&mut coordinator, &mut run_loop).unwrap();
    assert!(report.ran_main_loop);
    assert!(ran.get());

    let task = log.position("loop:task").unwrap();
    assert!(log.position("post:main_execution").unwrap() < task);
    assert!(task < log.position("pre:post_main_message_loop_run").unwrap());
}

/// Test that a failing run loop stops before the post-run phase
#[test]
fn test_run_loop_failure_skips_post_run() {
    let params = StartupParameters {
        test_harness: false,
        ..StartupParameters::for_test_harness()
    };
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));
    let mut run_loop = QueuedRunLoop::new();
    run_loop.post(|| anyhow::bail!("event source closed"));

    let err = drive_startup(&mut coordinator, &mut run_loop).unwrap_err();
    assert!(matches!(err, DriverError::RunLoop(_)));
    assert_eq!(coordinator.current_phase(), Some(Phase::MainExecution));
    assert!(!log.contains("flush:persistent"));
}

/// Test a headless startup against an on-disk store
#[test]
fn test_headless_startup_persists_browser_state() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("profile").join("default");
    let mut params = StartupParameters::for_test_harness();
    params.storage.data_dir = Some(data_dir.clone());
    params.storage.cache_capacity_bytes = 1024 * 1024;

    {
        let mut coordinator = LifecycleCoordinator::headless(&params);
        coordinator.early_initialization().unwrap();
        assert!(data_dir.is_dir());

        coordinator.main_message_loop_start().unwrap();
        coordinator.enter_main_execution_phase().unwrap();

        let browser = coordinator.browser_context().unwrap();
        assert!(browser.store().is_persistent());
        assert_eq!(browser.data_dir(), Some(data_dir.as_path()));
        browser.store().put(b"homepage", b"about:blank").unwrap();

        let off_the_record = coordinator.off_the_record_context().unwrap();
        assert!(!off_the_record.store().is_persistent());
        assert!(off_the_record.data_dir().is_none());
        off_the_record.store().put(b"homepage", b"private").unwrap();

        coordinator.post_main_message_loop_run().unwrap();
    }

    let reopened = SledBackingStore::open(&data_dir, 1024 * 1024).unwrap();
    assert_eq!(
        reopened.get(b"homepage").unwrap(),
        Some(b"about:blank".to_vec())
    );
}
