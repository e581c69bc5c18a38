//! In-memory knowledge store. All data is lost on process exit.

use std::sync::RwLock;

use crate::error::StoreError;

use super::{KnowledgeStore, Snapshot, StoreResult};

/// Snapshot held behind a lock.
#[derive(Debug, Default)]
pub struct MemStore {
    snapshot: RwLock<Snapshot>,
}

impl MemStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnowledgeStore for MemStore {
    fn load_all(&self) -> StoreResult<Snapshot> {
        let guard = self.snapshot.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn write_all(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let mut guard = self.snapshot.write().map_err(|_| StoreError::Poisoned)?;
        *guard = snapshot.clone();
        Ok(())
    }
}
