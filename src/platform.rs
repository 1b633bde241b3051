//! Platform hook seam
//!
//! Platform-specific startup code plugs in through [`PlatformHooks`]. The
//! coordinator calls `pre_phase` before its own work for a phase and
//! `post_phase` after it. Hooks can add behavior around a phase; they have no
//! way to run, skip, or reorder the coordinator's common work.

use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extension points invoked around every phase.
///
/// A returned error aborts startup: the coordinator wraps it as a
/// `LifecycleError::HookFailure` and runs no further phases.
pub trait PlatformHooks {
    fn pre_phase(&mut self, _phase: Phase) -> anyhow::Result<()> {
        Ok(())
    }

    fn post_phase(&mut self, _phase: Phase) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl PlatformHooks for NoopHooks {}

/// Platform the host is running on, as selected by the startup parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Linux,
    MacOs,
    Windows,
    Headless,
}

impl PlatformKind {
    /// Platform of the running binary.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            PlatformKind::Linux
        } else if cfg!(target_os = "macos") {
            PlatformKind::MacOs
        } else if cfg!(target_os = "windows") {
            PlatformKind::Windows
        } else {
            PlatformKind::Headless
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformKind::Linux => "linux",
            PlatformKind::MacOs => "macos",
            PlatformKind::Windows => "windows",
            PlatformKind::Headless => "headless",
        }
    }
}

impl Default for PlatformKind {
    fn default() -> Self {
        Self::current()
    }
}

/// Hooks for a native platform. Each hook records that it ran.
#[derive(Debug, Clone)]
pub struct NativeHooks {
    kind: PlatformKind,
}

impl NativeHooks {
    pub fn kind(&self) -> PlatformKind {
        self.kind
    }
}

impl PlatformHooks for NativeHooks {
    fn pre_phase(&mut self, phase: Phase) -> anyhow::Result<()> {
        debug!(platform = self.kind.as_str(), phase = %phase, "Platform pre-hook");
        Ok(())
    }

    fn post_phase(&mut self, phase: Phase) -> anyhow::Result<()> {
        debug!(platform = self.kind.as_str(), phase = %phase, "Platform post-hook");
        Ok(())
    }
}

/// Select the hooks for a platform.
///
/// This is the only place platform selection happens; the rest of the crate
/// sees a `dyn PlatformHooks`.
pub fn hooks_for(kind: PlatformKind) -> Box<dyn PlatformHooks> {
    match kind {
        PlatformKind::Headless => Box::new(NoopHooks),
        PlatformKind::Linux | PlatformKind::MacOs | PlatformKind::Windows => {
            Box::new(NativeHooks { kind })
        }
    }
}
