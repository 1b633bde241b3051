//! Primary UI surface
//!
//! The top-level window is created once both execution contexts exist, so the
//! window may read context state while it is being built. The coordinator owns
//! the resulting [`PrimaryUiSurface`] and drops it before either context.

use crate::context::ExecutionContext;
use crate::phase::LogicalTimestamp;
use tracing::debug;

/// Handle of the native window backing the UI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub u64);

/// A native top-level window. Dropping it closes the window.
pub trait NativeWindow {
    fn handle(&self) -> NativeWindowHandle;
}

/// Read access to both execution contexts while the UI is built.
#[derive(Debug, Clone, Copy)]
pub struct ContextPair<'a> {
    pub persistent: &'a ExecutionContext,
    pub off_the_record: &'a ExecutionContext,
}

/// Builds the native window for the primary UI surface.
pub trait UiSurfaceFactory {
    fn create_window(&mut self, contexts: ContextPair<'_>) -> anyhow::Result<Box<dyn NativeWindow>>;
}

/// The top-level UI object owned by the coordinator.
pub struct PrimaryUiSurface {
    window: Box<dyn NativeWindow>,
    created_at: LogicalTimestamp,
}

impl PrimaryUiSurface {
    pub(crate) fn new(window: Box<dyn NativeWindow>, created_at: LogicalTimestamp) -> Self {
        debug!(
            handle = window.handle().0,
            created_at = created_at.value(),
            "Primary UI surface created"
        );
        Self { window, created_at }
    }

    pub fn native_handle(&self) -> NativeWindowHandle {
        self.window.handle()
    }

    pub fn created_at(&self) -> LogicalTimestamp {
        self.created_at
    }
}

impl std::fmt::Debug for PrimaryUiSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryUiSurface")
            .field("handle", &self.native_handle())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Drop for PrimaryUiSurface {
    fn drop(&mut self) {
        debug!(handle = self.window.handle().0, "Primary UI surface released");
    }
}

/// Window used when there is no display.
#[derive(Debug)]
pub struct HeadlessWindow {
    handle: NativeWindowHandle,
}

impl NativeWindow for HeadlessWindow {
    fn handle(&self) -> NativeWindowHandle {
        self.handle
    }
}

/// Hands out headless windows with sequential handles.
#[derive(Debug, Default)]
pub struct HeadlessUiFactory {
    next_handle: u64,
}

impl UiSurfaceFactory for HeadlessUiFactory {
    fn create_window(&mut self, contexts: ContextPair<'_>) -> anyhow::Result<Box<dyn NativeWindow>> {
        if contexts.persistent.is_off_the_record() || !contexts.off_the_record.is_off_the_record() {
            anyhow::bail!("context pair is swapped");
        }
        self.next_handle += 1;
        Ok(Box::new(HeadlessWindow {
            handle: NativeWindowHandle(self.next_handle),
        }))
    }
}
