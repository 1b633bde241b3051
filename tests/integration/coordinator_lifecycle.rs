//! Integration tests for phase sequencing and accessor availability

use super::test_utils::{recording_parts, EventLog};
use stagecoach::error::{LifecycleError, Resource};
use stagecoach::{LifecycleCoordinator, LifecycleState, Phase, StartupParameters};

/// Test that nothing is reachable before the main execution phase
#[test]
fn test_accessors_absent_before_main_execution() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));

    for step in 0..3 {
        assert!(matches!(
            coordinator.browser_context(),
            Err(LifecycleError::PrematureAccess {
                resource: Resource::BrowserContext
            })
        ));
        assert!(matches!(
            coordinator.off_the_record_context(),
            Err(LifecycleError::PrematureAccess {
                resource: Resource::OffTheRecordContext
            })
        ));
        match step {
            0 => coordinator.early_initialization().unwrap(),
            1 => coordinator.main_message_loop_start().unwrap(),
            _ => {}
        }
    }

    coordinator.enter_main_execution_phase().unwrap();
    assert!(coordinator.browser_context().is_ok());
    assert!(coordinator.off_the_record_context().is_ok());
}

/// Test that the persistent context, the ephemeral context, and the UI are
/// created in that order
#[test]
fn test_construction_order() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));
    coordinator.enter_main_execution_phase().unwrap();

    let persistent = coordinator.browser_context().unwrap().created_at();
    let ephemeral = coordinator.off_the_record_context().unwrap().created_at();
    let ui = coordinator.primary_ui().unwrap().created_at();
    assert!(persistent < ephemeral);
    assert!(ephemeral < ui);

    assert_eq!(
        log.events(),
        vec![
            "pre:main_execution".to_string(),
            "open:persistent".to_string(),
            format!("open:ephemeral after persistent@{}", persistent.value()),
            format!(
                "create:ui persistent@{} ephemeral@{}",
                persistent.value(),
                ephemeral.value()
            ),
            "post:main_execution".to_string(),
        ]
    );
}

/// Test that re-entering the main execution phase is rejected every time
#[test]
fn test_main_execution_reentry_is_rejected_consistently() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));
    coordinator.enter_main_execution_phase().unwrap();
    let first = coordinator.browser_context().unwrap().created_at();
    let events_after_first = log.events().len();

    for _ in 0..3 {
        assert!(matches!(
            coordinator.enter_main_execution_phase(),
            Err(LifecycleError::PhaseReentered {
                phase: Phase::MainExecution
            })
        ));
    }

    // No hooks ran and nothing was rebuilt.
    assert_eq!(log.events().len(), events_after_first);
    assert_eq!(coordinator.browser_context().unwrap().created_at(), first);
    assert_eq!(
        coordinator.state(),
        LifecycleState::Completed(Phase::MainExecution)
    );
}

/// Test the run-loop flag in and out of test-harness mode
#[test]
fn test_run_loop_flag() {
    let harness = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&harness, recording_parts(&log));
    coordinator.enter_main_execution_phase().unwrap();
    assert!(!coordinator.should_run_main_loop().unwrap());

    let interactive = StartupParameters {
        test_harness: false,
        ..StartupParameters::for_test_harness()
    };
    let mut coordinator = LifecycleCoordinator::new(&interactive, recording_parts(&log));
    coordinator.enter_main_execution_phase().unwrap();
    assert!(coordinator.should_run_main_loop().unwrap());
}

/// Test that phases may be skipped but never revisited
#[test]
fn test_phases_only_move_forward() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));

    coordinator.early_initialization().unwrap();
    coordinator.enter_main_execution_phase().unwrap();

    assert!(matches!(
        coordinator.main_message_loop_start(),
        Err(LifecycleError::PhaseOutOfOrder {
            requested: Phase::MainMessageLoopStart,
            current: Phase::MainExecution
        })
    ));
    assert!(matches!(
        coordinator.early_initialization(),
        Err(LifecycleError::PhaseReentered {
            phase: Phase::EarlyInitialization
        })
    ));

    coordinator.post_main_message_loop_run().unwrap();
    assert_eq!(
        coordinator.completed_phases(),
        &[
            Phase::EarlyInitialization,
            Phase::MainExecution,
            Phase::PostMainMessageLoopRun
        ]
    );
}

/// Test that only the persistent context is flushed after the main loop
#[test]
fn test_post_run_flushes_persistent_context_only() {
    let params = StartupParameters::for_test_harness();
    let log = EventLog::new();
    let mut coordinator = LifecycleCoordinator::new(&params, recording_parts(&log));
    coordinator.enter_main_execution_phase().unwrap();
    coordinator.post_main_message_loop_run().unwrap();

    assert_eq!(log.matching("flush:"), vec!["flush:persistent".to_string()]);
    assert!(coordinator.browser_context().is_ok());
}
