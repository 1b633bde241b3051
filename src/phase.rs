//! Startup phases and the logical clock that stamps what they create.
//!
//! Each phase runs in three steps: the platform pre-hook, the coordinator's
//! common work, then the platform post-hook. Phases are declared in execution
//! order, so the derived `Ord` is the sequencing rule.

use serde::{Deserialize, Serialize};

/// Ordered startup phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Work that should happen as soon as possible after process start.
    EarlyInitialization,
    /// Work tied to the start of the main message loop.
    MainMessageLoopStart,
    /// Creation of the execution contexts and the primary UI surface.
    MainExecution,
    /// Work after the main message loop has returned.
    PostMainMessageLoopRun,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::EarlyInitialization,
        Phase::MainMessageLoopStart,
        Phase::MainExecution,
        Phase::PostMainMessageLoopRun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::EarlyInitialization => "early_initialization",
            Phase::MainMessageLoopStart => "main_message_loop_start",
            Phase::MainExecution => "main_execution",
            Phase::PostMainMessageLoopRun => "post_main_message_loop_run",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which platform hook of a phase is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    Pre,
    Post,
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStage::Pre => f.write_str("pre"),
            HookStage::Post => f.write_str("post"),
        }
    }
}

/// Where a coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No phase has been entered yet.
    Constructed,
    /// The given phase is the latest one that ran to completion.
    Completed(Phase),
    /// The given phase failed; no further phase may run.
    Aborted(Phase),
}

/// A point in the coordinator's logical time. Not related to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalTimestamp(u64);

impl LogicalTimestamp {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter owned by a single coordinator.
#[derive(Debug, Default)]
pub struct LogicalClock {
    next: u64,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next timestamp. Every call returns a strictly larger value.
    pub fn tick(&mut self) -> LogicalTimestamp {
        self.next = self.next.saturating_add(1);
        LogicalTimestamp(self.next)
    }
}
