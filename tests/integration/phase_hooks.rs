//! Integration tests for the pre-hook / common work / post-hook contract

use super::test_utils::{recording_parts, EventLog, RecordingHooks};
use stagecoach::error::LifecycleError;
use stagecoach::phase::HookStage;
use stagecoach::{LifecycleCoordinator, LifecycleState, Phase, StartupParameters};

/// Test that every phase brackets its common work with the platform hooks
#[test]
fn test_hooks_bracket_every_phase() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));

    coordinator.early_initialization().unwrap();
    coordinator.main_message_loop_start().unwrap();
    coordinator.enter_main_execution_phase().unwrap();
    coordinator.post_main_message_loop_run().unwrap();

    let hooks: Vec<String> = log
        .events()
        .into_iter()
        .filter(|e| e.starts_with("pre:") || e.starts_with("post:"))
        .collect();
    let expected: Vec<String> = Phase::ALL
        .iter()
        .flat_map(|phase| [format!("pre:{}", phase), format!("post:{}", phase)])
        .collect();
    assert_eq!(hooks, expected);

    let pre = log.position("pre:main_execution").unwrap();
    let open = log.position("open:persistent").unwrap();
    let post = log.position("post:main_execution").unwrap();
    assert!(pre < open && open < post);

    let pre = log.position("pre:post_main_message_loop_run").unwrap();
    let flush = log.position("flush:persistent").unwrap();
    let post = log.position("post:post_main_message_loop_run").unwrap();
    assert!(pre < flush && flush < post);
}

/// Test that a failing pre-hook stops the phase before any common work
#[test]
fn test_pre_hook_failure_skips_common_work() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let parts = recording_parts(&log).with_hooks(RecordingHooks::failing_at(
        log.clone(),
        Phase::MainExecution,
        HookStage::Pre,
    ));
    let mut coordinator = LifecycleCoordinator::new(&params, parts);

    let err = coordinator.enter_main_execution_phase().unwrap_err();
    match &err {
        LifecycleError::HookFailure { phase, stage, .. } => {
            assert_eq!(*phase, Phase::MainExecution);
            assert_eq!(*stage, HookStage::Pre);
        }
        other => panic!("expected hook failure, got {other:?}"),
    }
    assert!(err.is_fatal());
    assert!(!log.contains("open:persistent"));
    assert!(!log.contains("post:main_execution"));
    assert_eq!(
        coordinator.state(),
        LifecycleState::Aborted(Phase::MainExecution)
    );
}

/// Test that startup stays aborted after a hook failure
#[test]
fn test_no_phase_runs_after_abort() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let parts = recording_parts(&log).with_hooks(RecordingHooks::failing_at(
        log.clone(),
        Phase::EarlyInitialization,
        HookStage::Post,
    ));
    let mut coordinator = LifecycleCoordinator::new(&params, parts);

    assert!(coordinator.early_initialization().is_err());
    let events = log.events().len();

    for result in [
        coordinator.main_message_loop_start(),
        coordinator.enter_main_execution_phase(),
        coordinator.post_main_message_loop_run(),
    ] {
        assert!(matches!(
            result,
            Err(LifecycleError::StartupAborted {
                phase: Phase::EarlyInitialization
            })
        ));
    }
    assert_eq!(log.events().len(), events);
    assert!(coordinator.completed_phases().is_empty());
}

/// Test that a failing post-hook leaves the contexts unpublished but owned
#[test]
fn test_post_hook_failure_keeps_contexts_unpublished() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    {
        let parts = recording_parts(&log).with_hooks(RecordingHooks::failing_at(
            log.clone(),
            Phase::MainExecution,
            HookStage::Post,
        ));
        let mut coordinator = LifecycleCoordinator::new(&params, parts);

        assert!(coordinator.enter_main_execution_phase().is_err());
        assert!(log.contains("open:persistent"));
        assert!(matches!(
            coordinator.browser_context(),
            Err(LifecycleError::PrematureAccess { .. })
        ));
        assert!(coordinator.should_run_main_loop().is_err());
        assert!(log.matching("drop:").is_empty());
    }
    assert_eq!(
        log.matching("drop:"),
        vec!["drop:ui", "drop:ephemeral", "drop:persistent"]
    );
}
