//! Host driver
//!
//! Calls the coordinator's phase entries in their fixed order and hands control
//! to the host run loop when the run-loop flag asks for it.

use crate::coordinator::LifecycleCoordinator;
use crate::error::DriverError;
use crate::phase::Phase;
use crate::run_loop::RunLoop;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a driven startup did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupReport {
    /// Phases that ran to completion, in order
    pub phases: Vec<Phase>,
    /// Whether the driver ran the main loop itself
    pub ran_main_loop: bool,
}

/// Drive a coordinator through every phase.
///
/// Stops at the first error. The caller still owns the coordinator, so
/// teardown happens when it is dropped whether or not startup succeeded.
pub fn drive_startup(
    coordinator: &mut LifecycleCoordinator<'_>,
    run_loop: &mut dyn RunLoop,
) -> Result<StartupReport, DriverError> {
    coordinator.early_initialization()?;
    coordinator.main_message_loop_start()?;
    coordinator.enter_main_execution_phase()?;

    let ran_main_loop = coordinator.should_run_main_loop()?;
    if ran_main_loop {
        info!("Running main loop");
        run_loop.run().map_err(DriverError::RunLoop)?;
    } else {
        info!("Main loop left to the test harness");
    }

    coordinator.post_main_message_loop_run()?;

    Ok(StartupReport {
        phases: coordinator.completed_phases().to_vec(),
        ran_main_loop,
    })
}
