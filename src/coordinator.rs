//! Lifecycle coordinator
//!
//! Drives the ordered startup phases and owns what they create: the persistent
//! execution context, the off-the-record context, and the primary UI surface.
//!
//! Every phase entry goes through one private sequencer that runs the platform
//! pre-hook, the phase's common work, then the platform post-hook. Common work
//! lives in private inherent methods, so platform code can only extend a phase
//! through [`PlatformHooks`]; it cannot reorder or skip the shared steps.
//!
//! Re-entry is strict: every phase runs at most once, phases only move forward,
//! and any failure aborts the rest of startup.

use crate::config::StartupParameters;
use crate::context::{
    ContextKind, ContextSettings, ExecutionContext, SledStoreProvider, StoreProvider,
};
use crate::error::{LifecycleError, Resource, StoreError};
use crate::phase::{HookStage, LifecycleState, LogicalClock, Phase};
use crate::platform::{hooks_for, PlatformHooks};
use crate::ui::{ContextPair, HeadlessUiFactory, PrimaryUiSurface, UiSurfaceFactory};
use tracing::{debug, error, info};

/// Collaborators a coordinator delegates to.
pub struct CoordinatorParts {
    pub hooks: Box<dyn PlatformHooks>,
    pub stores: Box<dyn StoreProvider>,
    pub ui: Box<dyn UiSurfaceFactory>,
}

impl CoordinatorParts {
    /// Hooks for the configured platform, sled stores, and a headless window.
    pub fn headless(parameters: &StartupParameters) -> Self {
        Self {
            hooks: hooks_for(parameters.platform),
            stores: Box::new(SledStoreProvider),
            ui: Box::new(HeadlessUiFactory::default()),
        }
    }

    pub fn with_hooks(mut self, hooks: impl PlatformHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_stores(mut self, stores: impl StoreProvider + 'static) -> Self {
        self.stores = Box::new(stores);
        self
    }

    pub fn with_ui(mut self, ui: impl UiSurfaceFactory + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }
}

/// Sequences startup phases for one host process.
///
/// The coordinator borrows the startup parameters for its whole life; the
/// borrow checker enforces that they outlive it. It is neither `Send` nor
/// `Sync`: phases and teardown run on the thread that drives startup.
pub struct LifecycleCoordinator<'p> {
    parameters: &'p StartupParameters,
    parts: CoordinatorParts,
    state: LifecycleState,
    completed: Vec<Phase>,
    clock: LogicalClock,
    browser_context: Option<ExecutionContext>,
    off_the_record_context: Option<ExecutionContext>,
    primary_ui: Option<PrimaryUiSurface>,
    run_message_loop: Option<bool>,
}

impl<'p> LifecycleCoordinator<'p> {
    /// Record the parameters and collaborators. Allocates no contexts.
    pub fn new(parameters: &'p StartupParameters, parts: CoordinatorParts) -> Self {
        Self {
            parameters,
            parts,
            state: LifecycleState::Constructed,
            completed: Vec::with_capacity(Phase::ALL.len()),
            clock: LogicalClock::new(),
            browser_context: None,
            off_the_record_context: None,
            primary_ui: None,
            run_message_loop: None,
        }
    }

    /// Coordinator with [`CoordinatorParts::headless`] collaborators.
    pub fn headless(parameters: &'p StartupParameters) -> Self {
        Self::new(parameters, CoordinatorParts::headless(parameters))
    }

    pub fn parameters(&self) -> &StartupParameters {
        self.parameters
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The latest phase that ran to completion.
    pub fn current_phase(&self) -> Option<Phase> {
        self.completed.last().copied()
    }

    /// Phases that ran to completion, in order.
    pub fn completed_phases(&self) -> &[Phase] {
        &self.completed
    }

    pub fn early_initialization(&mut self) -> Result<(), LifecycleError> {
        self.run_phase(Phase::EarlyInitialization, Self::prepare_data_dir)
    }

    pub fn main_message_loop_start(&mut self) -> Result<(), LifecycleError> {
        self.run_phase(Phase::MainMessageLoopStart, |_| {
            debug!("Main message loop starting");
            Ok(())
        })
    }

    /// Create both execution contexts and the primary UI surface, then decide
    /// whether the host should run the main loop.
    pub fn enter_main_execution_phase(&mut self) -> Result<(), LifecycleError> {
        self.run_phase(Phase::MainExecution, Self::create_contexts_and_ui)
    }

    /// Flush the persistent context after the main loop has returned.
    pub fn post_main_message_loop_run(&mut self) -> Result<(), LifecycleError> {
        self.check_entry(Phase::PostMainMessageLoopRun)?;
        self.browser_context()?;
        self.run_phase(Phase::PostMainMessageLoopRun, Self::flush_persistent_state)
    }

    pub fn browser_context(&self) -> Result<&ExecutionContext, LifecycleError> {
        self.published(self.browser_context.as_ref(), Resource::BrowserContext)
    }

    pub fn off_the_record_context(&self) -> Result<&ExecutionContext, LifecycleError> {
        self.published(
            self.off_the_record_context.as_ref(),
            Resource::OffTheRecordContext,
        )
    }

    pub fn primary_ui(&self) -> Result<&PrimaryUiSurface, LifecycleError> {
        self.published(self.primary_ui.as_ref(), Resource::PrimaryUi)
    }

    /// Whether the host should run the blocking main loop itself.
    pub fn should_run_main_loop(&self) -> Result<bool, LifecycleError> {
        self.published(self.run_message_loop.as_ref(), Resource::RunLoopFlag)
            .copied()
    }

    fn main_execution_completed(&self) -> bool {
        self.completed.contains(&Phase::MainExecution)
    }

    fn published<'a, T>(
        &'a self,
        slot: Option<&'a T>,
        resource: Resource,
    ) -> Result<&'a T, LifecycleError> {
        match slot {
            Some(value) if self.main_execution_completed() => Ok(value),
            _ => Err(LifecycleError::PrematureAccess { resource }),
        }
    }

    fn check_entry(&self, requested: Phase) -> Result<(), LifecycleError> {
        if let LifecycleState::Aborted(phase) = self.state {
            return Err(LifecycleError::StartupAborted { phase });
        }
        if self.completed.contains(&requested) {
            return Err(LifecycleError::PhaseReentered { phase: requested });
        }
        match self.current_phase() {
            Some(current) if requested < current => {
                Err(LifecycleError::PhaseOutOfOrder { requested, current })
            }
            _ => Ok(()),
        }
    }

    fn run_phase<F>(&mut self, phase: Phase, common: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(&mut Self) -> Result<(), LifecycleError>,
    {
        self.check_entry(phase)?;
        info!(phase = %phase, "Entering phase");

        match self.run_steps(phase, common) {
            Ok(()) => {
                self.completed.push(phase);
                self.state = LifecycleState::Completed(phase);
                info!(phase = %phase, "Phase completed");
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Aborted(phase);
                error!(phase = %phase, error = %e, "Phase failed; startup aborted");
                Err(e)
            }
        }
    }

    fn run_steps<F>(&mut self, phase: Phase, common: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(&mut Self) -> Result<(), LifecycleError>,
    {
        self.parts
            .hooks
            .pre_phase(phase)
            .map_err(|source| LifecycleError::HookFailure {
                phase,
                stage: HookStage::Pre,
                source,
            })?;
        common(self)?;
        self.parts
            .hooks
            .post_phase(phase)
            .map_err(|source| LifecycleError::HookFailure {
                phase,
                stage: HookStage::Post,
                source,
            })
    }

    fn prepare_data_dir(&mut self) -> Result<(), LifecycleError> {
        if let Some(dir) = &self.parameters.storage.data_dir {
            std::fs::create_dir_all(dir).map_err(StoreError::from)?;
            debug!(data_dir = %dir.display(), "Data directory ready");
        }
        Ok(())
    }

    fn create_contexts_and_ui(&mut self) -> Result<(), LifecycleError> {
        let settings = ContextSettings::from_storage(&self.parameters.storage);
        let store = self
            .parts
            .stores
            .open_persistent(&settings)
            .map_err(|source| LifecycleError::ContextCreation {
                kind: ContextKind::Persistent,
                source,
            })?;
        let browser = ExecutionContext::new(
            ContextKind::Persistent,
            settings,
            self.clock.tick(),
            store,
        );

        // The ephemeral store may read from the persistent context, never the reverse.
        let store = self
            .parts
            .stores
            .open_ephemeral(&browser)
            .map_err(|source| LifecycleError::ContextCreation {
                kind: ContextKind::Ephemeral,
                source,
            })?;
        let off_the_record = ExecutionContext::new(
            ContextKind::Ephemeral,
            browser.settings().for_ephemeral(),
            self.clock.tick(),
            store,
        );

        let window = self
            .parts
            .ui
            .create_window(ContextPair {
                persistent: &browser,
                off_the_record: &off_the_record,
            })
            .map_err(|source| LifecycleError::UiCreation { source })?;
        let primary_ui = PrimaryUiSurface::new(window, self.clock.tick());

        // Publish only fully built objects.
        self.browser_context = Some(browser);
        self.off_the_record_context = Some(off_the_record);
        self.primary_ui = Some(primary_ui);
        self.run_message_loop = Some(!self.parameters.test_harness);
        debug!(
            run_message_loop = !self.parameters.test_harness,
            "Run-loop decision recorded"
        );
        Ok(())
    }

    fn flush_persistent_state(&mut self) -> Result<(), LifecycleError> {
        if let Some(context) = &self.browser_context {
            context.flush()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LifecycleCoordinator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("state", &self.state)
            .field("completed", &self.completed)
            .field("browser_context", &self.browser_context)
            .field("off_the_record_context", &self.off_the_record_context)
            .field("primary_ui", &self.primary_ui)
            .field("run_message_loop", &self.run_message_loop)
            .finish()
    }
}

impl Drop for LifecycleCoordinator<'_> {
    /// Release the UI, then the ephemeral context, then the persistent one.
    /// Slots that were never filled are skipped.
    fn drop(&mut self) {
        drop(self.primary_ui.take());
        drop(self.off_the_record_context.take());
        drop(self.browser_context.take());
        debug!(state = ?self.state, "Lifecycle coordinator destroyed");
    }
}
