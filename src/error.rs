//! Error types for the staged lifecycle coordinator.

use crate::context::ContextKind;
use crate::phase::{HookStage, Phase};
use thiserror::Error;

/// Something an accessor can hand out once its owning phase has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    BrowserContext,
    OffTheRecordContext,
    PrimaryUi,
    RunLoopFlag,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::BrowserContext => "browser context",
            Resource::OffTheRecordContext => "off-the-record context",
            Resource::PrimaryUi => "primary UI surface",
            Resource::RunLoopFlag => "run-loop flag",
        };
        f.write_str(name)
    }
}

/// Backing store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open backing store: {0}")]
    Open(String),

    #[error("Backing store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backing store error: {0}")]
    Backend(#[from] sled::Error),
}

/// Errors surfaced by the lifecycle coordinator to the host driver
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Phase {phase} was already entered")]
    PhaseReentered { phase: Phase },

    #[error("Phase {requested} cannot run after {current}")]
    PhaseOutOfOrder { requested: Phase, current: Phase },

    #[error("Startup was aborted during {phase}; no further phases may run")]
    StartupAborted { phase: Phase },

    #[error("The {resource} is not available before the main execution phase completes")]
    PrematureAccess { resource: Resource },

    #[error("Platform {stage} hook failed for {phase}: {source}")]
    HookFailure {
        phase: Phase,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to create {kind} execution context: {source}")]
    ContextCreation {
        kind: ContextKind,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create primary UI surface: {source}")]
    UiCreation {
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LifecycleError {
    /// Whether the host should treat this as fatal to startup.
    ///
    /// Premature access is a caller contract violation the host may choose to
    /// tolerate; every other variant leaves startup unable to continue.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LifecycleError::PrematureAccess { .. })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Errors from driving a full startup sequence
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Main run loop failed: {0}")]
    RunLoop(#[source] anyhow::Error),
}
