//! Knowledge store: the single durable owner of atomics and triples.
//!
//! The whole history is loaded into memory at the start of every iteration
//! and the whole merged snapshot is written back at the end. Two backends:
//!
//! - [`MemStore`]: snapshot behind a lock, lost on exit (tests, dry runs)
//! - [`DurableStore`]: redb file, replaced in a single write transaction
//!
//! Graphs, Markov models and inference records are never stored here.

pub mod durable;
pub mod mem;

use serde::{Deserialize, Serialize};

pub use durable::DurableStore;
pub use mem::MemStore;

use crate::error::StoreError;
use crate::knowledge::AtomicMap;
use crate::ngram::TripleMap;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Complete persisted state: every atomic and triple ever observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub atomics: AtomicMap,
    pub triples: TripleMap,
    /// Iteration number of the last completed run (0 before the first).
    pub last_iteration: u64,
    /// Response text of the last completed run.
    pub last_response: Option<String>,
}

impl Snapshot {
    /// True when no fact has ever been observed.
    pub fn is_empty(&self) -> bool {
        self.atomics.is_empty() && self.triples.is_empty()
    }
}

/// Load-all / write-all access to durable knowledge.
pub trait KnowledgeStore {
    /// Read the entire store. A store that does not exist yet is empty, not an error.
    fn load_all(&self) -> StoreResult<Snapshot>;

    /// Replace the stored snapshot with `snapshot` as one unit.
    fn write_all(&self, snapshot: &Snapshot) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::{FOLLOWS, Triple};

    #[test]
    fn empty_snapshot() {
        let snap = Snapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.last_iteration, 0);
    }

    #[test]
    fn snapshot_with_triple_is_not_empty() {
        let mut snap = Snapshot::default();
        let t = Triple::new("a", FOLLOWS, "b", 1, 0);
        snap.triples.insert(t.key(), t);
        assert!(!snap.is_empty());
    }
}
