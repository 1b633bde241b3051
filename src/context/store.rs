//! Backing stores for execution contexts

use crate::context::{ContextSettings, ExecutionContext};
use crate::error::StoreError;
use std::path::Path;
use tracing::debug;

/// Opaque storage/cache provider wrapped by an execution context.
pub trait BackingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn flush(&self) -> Result<(), StoreError>;

    /// Whether the store survives the process.
    fn is_persistent(&self) -> bool;
}

/// Opens the backing stores for the two execution contexts.
pub trait StoreProvider {
    fn open_persistent(
        &mut self,
        settings: &ContextSettings,
    ) -> Result<Box<dyn BackingStore>, StoreError>;

    /// Open the off-the-record store. The persistent context already exists
    /// and may be read, e.g. to inherit its settings.
    fn open_ephemeral(
        &mut self,
        persistent: &ExecutionContext,
    ) -> Result<Box<dyn BackingStore>, StoreError>;
}

/// Sled-based implementation of BackingStore
pub struct SledBackingStore {
    db: sled::Db,
    persistent: bool,
}

impl SledBackingStore {
    /// Open an on-disk store at the given directory.
    pub fn open<P: AsRef<Path>>(path: P, cache_capacity_bytes: u64) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .path(path.as_ref())
            .cache_capacity(cache_capacity_bytes)
            .open()
            .map_err(|e| {
                StoreError::Open(format!(
                    "Failed to open sled database at {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
        Ok(Self {
            db,
            persistent: true,
        })
    }

    /// Open a store that is removed when dropped.
    pub fn temporary(cache_capacity_bytes: u64) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .cache_capacity(cache_capacity_bytes)
            .open()
            .map_err(|e| StoreError::Open(format!("Failed to open temporary sled database: {}", e)))?;
        Ok(Self {
            db,
            persistent: false,
        })
    }
}

impl BackingStore for SledBackingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        let bytes = self.db.flush()?;
        debug!(bytes, "Backing store flushed");
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }
}

/// Store provider backed by sled.
///
/// The persistent store lives on disk when a data directory is configured and
/// in a temporary database otherwise. The ephemeral store is always temporary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SledStoreProvider;

impl StoreProvider for SledStoreProvider {
    fn open_persistent(
        &mut self,
        settings: &ContextSettings,
    ) -> Result<Box<dyn BackingStore>, StoreError> {
        let store = match &settings.data_dir {
            Some(dir) => SledBackingStore::open(dir, settings.cache_capacity_bytes)?,
            None => SledBackingStore::temporary(settings.cache_capacity_bytes)?,
        };
        Ok(Box::new(store))
    }

    fn open_ephemeral(
        &mut self,
        persistent: &ExecutionContext,
    ) -> Result<Box<dyn BackingStore>, StoreError> {
        let settings = persistent.settings().for_ephemeral();
        Ok(Box::new(SledBackingStore::temporary(
            settings.cache_capacity_bytes,
        )?))
    }
}
