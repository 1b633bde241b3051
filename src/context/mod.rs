//! Execution contexts
//!
//! An execution context is an isolated scope of persistent state (cookies,
//! storage, caches) that downstream subsystems query. A coordinator owns
//! exactly one persistent context and at most one ephemeral (off-the-record)
//! context. Both wrap an opaque [`BackingStore`].

pub mod store;

pub use store::{BackingStore, SledBackingStore, SledStoreProvider, StoreProvider};

use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::phase::LogicalTimestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Persistent,
    Ephemeral,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextKind::Persistent => f.write_str("persistent"),
            ContextKind::Ephemeral => f.write_str("ephemeral"),
        }
    }
}

/// Settings a backing store is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSettings {
    /// On-disk location, if any. Ephemeral contexts never have one.
    pub data_dir: Option<PathBuf>,
    pub cache_capacity_bytes: u64,
}

impl ContextSettings {
    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self {
            data_dir: storage.data_dir.clone(),
            cache_capacity_bytes: storage.cache_capacity_bytes,
        }
    }

    /// Settings for an ephemeral context derived from the persistent one.
    pub fn for_ephemeral(&self) -> Self {
        Self {
            data_dir: None,
            cache_capacity_bytes: self.cache_capacity_bytes,
        }
    }
}

/// An isolated unit of state owned by the lifecycle coordinator.
pub struct ExecutionContext {
    kind: ContextKind,
    settings: ContextSettings,
    created_at: LogicalTimestamp,
    store: Box<dyn BackingStore>,
}

impl ExecutionContext {
    pub(crate) fn new(
        kind: ContextKind,
        settings: ContextSettings,
        created_at: LogicalTimestamp,
        store: Box<dyn BackingStore>,
    ) -> Self {
        debug!(kind = %kind, created_at = created_at.value(), "Execution context created");
        Self {
            kind,
            settings,
            created_at,
            store,
        }
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn is_off_the_record(&self) -> bool {
        self.kind == ContextKind::Ephemeral
    }

    pub fn created_at(&self) -> LogicalTimestamp {
        self.created_at
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.settings.data_dir.as_deref()
    }

    pub fn store(&self) -> &dyn BackingStore {
        self.store.as_ref()
    }

    /// Flush the backing store. Off-the-record state is never persisted.
    pub(crate) fn flush(&self) -> Result<(), StoreError> {
        if self.is_off_the_record() {
            return Ok(());
        }
        self.store.flush()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("kind", &self.kind)
            .field("settings", &self.settings)
            .field("created_at", &self.created_at)
            .field("persistent_store", &self.store.is_persistent())
            .finish()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        debug!(kind = %self.kind, "Execution context released");
    }
}
