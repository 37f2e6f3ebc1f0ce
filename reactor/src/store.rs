//! Key-value persistence backends.
//!
//! The reactor is the single writer; it persists its whole state under one
//! well-known key, so per-key atomicity is all a backend has to provide.

use {
    parking_lot::RwLock,
    std::{collections::HashMap, path::Path},
    thiserror::Error,
};

/// Errors surfaced by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to open.
    #[error("store open failed: {0}")]
    Open(String),

    /// A read or write failed.
    #[error("store io: {0}")]
    Io(String),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Minimal key-value surface the reactor persists through.
pub trait KvStore: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Atomically replace the value under `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryKvStore {
    map: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

/// Durable store backed by sled.  `put` inserts and flushes, so a value
/// observed after restart is always a complete former write.
pub struct SledKvStore {
    db: sled::Db,
}

impl SledKvStore {
    /// Open (or create) a sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        Ok(Self { db })
    }
}

impl KvStore for SledKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self.db.get(key).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db
            .insert(key, value)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        self.db.flush().map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}
