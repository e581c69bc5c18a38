//! ACID-durable knowledge store backed by redb.
//!
//! Atomics and triples live in their own tables, bincode-encoded and keyed by
//! fact string and relation key respectively. `write_all` drops and refills
//! every table inside one write transaction, so readers see either the previous
//! snapshot or the new one. redb locks the file while the database is open,
//! which keeps a second process from interleaving its own load-merge-write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, TableError};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

use super::{KnowledgeStore, Snapshot, StoreResult};

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

const ATOMICS_TABLE: Table = TableDefinition::new("atomics");
const TRIPLES_TABLE: Table = TableDefinition::new("triples");
const META_TABLE: Table = TableDefinition::new("meta");

const LAST_ITERATION: &str = "last_iteration";
const LAST_RESPONSE: &str = "last_response";

fn redb_err<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Redb {
        message: format!("{op} failed: {e}"),
    }
}

/// Knowledge store persisted in a single redb file.
pub struct DurableStore {
    db: Database,
    path: PathBuf,
}

impl DurableStore {
    /// Open the store at `path`, creating the file (and its directory) if needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;
        tracing::debug!(path = %path.display(), "opened knowledge store");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }
}

/// Decode a whole table. A table that was never created reads as empty.
fn read_table<T: DeserializeOwned>(
    txn: &ReadTransaction,
    def: Table,
) -> StoreResult<BTreeMap<String, T>> {
    let table = match txn.open_table(def) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(BTreeMap::new()),
        Err(e) => return Err(redb_err("open_table")(e)),
    };
    let mut out = BTreeMap::new();
    for entry in table.iter().map_err(redb_err("iter"))? {
        let (key, value) = entry.map_err(redb_err("read entry"))?;
        let decoded = bincode::deserialize(value.value()).map_err(|e| {
            StoreError::Serialization {
                message: format!("entry {:?}: {e}", key.value()),
            }
        })?;
        out.insert(key.value().to_string(), decoded);
    }
    Ok(out)
}

fn read_meta(txn: &ReadTransaction) -> StoreResult<(u64, Option<String>)> {
    let table = match txn.open_table(META_TABLE) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok((0, None)),
        Err(e) => return Err(redb_err("open_table")(e)),
    };

    let last_iteration = match table.get(LAST_ITERATION).map_err(redb_err("get"))? {
        Some(guard) => {
            let bytes: [u8; 8] =
                guard
                    .value()
                    .try_into()
                    .map_err(|_| StoreError::Serialization {
                        message: format!("{LAST_ITERATION} is not an 8-byte integer"),
                    })?;
            u64::from_le_bytes(bytes)
        }
        None => 0,
    };

    let last_response = match table.get(LAST_RESPONSE).map_err(redb_err("get"))? {
        Some(guard) => Some(String::from_utf8(guard.value().to_vec()).map_err(|e| {
            StoreError::Serialization {
                message: format!("{LAST_RESPONSE}: {e}"),
            }
        })?),
        None => None,
    };

    Ok((last_iteration, last_response))
}

fn encode<T: Serialize>(key: &str, value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization {
        message: format!("entry {key:?}: {e}"),
    })
}

impl KnowledgeStore for DurableStore {
    fn load_all(&self) -> StoreResult<Snapshot> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let atomics = read_table(&txn, ATOMICS_TABLE)?;
        let triples = read_table(&txn, TRIPLES_TABLE)?;
        let (last_iteration, last_response) = read_meta(&txn)?;
        tracing::debug!(
            atomics = atomics.len(),
            triples = triples.len(),
            last_iteration,
            "loaded knowledge store"
        );
        Ok(Snapshot {
            atomics,
            triples,
            last_iteration,
            last_response,
        })
    }

    fn write_all(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(redb_err("begin_write"))?;
        for def in [ATOMICS_TABLE, TRIPLES_TABLE, META_TABLE] {
            txn.delete_table(def).map_err(redb_err("delete_table"))?;
        }
        {
            let mut table = txn.open_table(ATOMICS_TABLE).map_err(redb_err("open_table"))?;
            for (fact, atomic) in &snapshot.atomics {
                let bytes = encode(fact, atomic)?;
                table
                    .insert(fact.as_str(), bytes.as_slice())
                    .map_err(redb_err("insert"))?;
            }
        }
        {
            let mut table = txn.open_table(TRIPLES_TABLE).map_err(redb_err("open_table"))?;
            for (key, triple) in &snapshot.triples {
                let bytes = encode(key, triple)?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .map_err(redb_err("insert"))?;
            }
        }
        {
            let mut table = txn.open_table(META_TABLE).map_err(redb_err("open_table"))?;
            let iteration = snapshot.last_iteration.to_le_bytes();
            table
                .insert(LAST_ITERATION, iteration.as_slice())
                .map_err(redb_err("insert"))?;
            if let Some(response) = &snapshot.last_response {
                table
                    .insert(LAST_RESPONSE, response.as_bytes())
                    .map_err(redb_err("insert"))?;
            }
        }
        txn.commit().map_err(redb_err("commit"))?;
        tracing::debug!(
            atomics = snapshot.atomics.len(),
            triples = snapshot.triples.len(),
            "wrote knowledge store"
        );
        Ok(())
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Atomic;
    use crate::ngram::{FOLLOWS, Triple};
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        let mut snap = Snapshot {
            last_iteration: 2,
            last_response: Some("I learned: hello world".into()),
            ..Default::default()
        };
        snap.atomics.insert(
            "hello follows world".into(),
            Atomic {
                count: 2,
                confidence: 2.0 / 3.0,
                iteration: 2,
            },
        );
        for iteration in 1..=2 {
            let t = Triple::new("hello", FOLLOWS, "world", iteration, 0);
            snap.triples.insert(t.key(), t);
        }
        snap
    }

    #[test]
    fn fresh_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(&dir.path().join("k.redb")).unwrap();
        let snap = store.load_all().unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.last_iteration, 0);
        assert_eq!(snap.last_response, None);
    }

    #[test]
    fn write_then_load() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(&dir.path().join("k.redb")).unwrap();
        let snap = sample();
        store.write_all(&snap).unwrap();
        assert_eq!(store.load_all().unwrap(), snap);
    }

    #[test]
    fn write_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(&dir.path().join("k.redb")).unwrap();
        store.write_all(&sample()).unwrap();

        let smaller = Snapshot {
            last_iteration: 9,
            ..Default::default()
        };
        store.write_all(&smaller).unwrap();
        let loaded = store.load_all().unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.last_iteration, 9);
        assert_eq!(loaded.last_response, None);
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("k.redb");
        {
            let store = DurableStore::open(&path).unwrap();
            store.write_all(&sample()).unwrap();
        }
        let store = DurableStore::open(&path).unwrap();
        assert_eq!(store.load_all().unwrap(), sample());
    }

    #[test]
    fn garbage_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.redb");
        std::fs::write(&path, b"definitely not a redb database, just some bytes").unwrap();
        assert!(matches!(
            DurableStore::open(&path),
            Err(StoreError::Redb { .. })
        ));
    }

    #[test]
    fn undecodable_entry_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(&dir.path().join("k.redb")).unwrap();
        store.write_all(&sample()).unwrap();
        {
            let txn = store.db.begin_write().unwrap();
            {
                let mut table = txn.open_table(ATOMICS_TABLE).unwrap();
                table.insert("broken fact", [0xFFu8; 3].as_slice()).unwrap();
            }
            txn.commit().unwrap();
        }
        assert!(matches!(
            store.load_all(),
            Err(StoreError::Serialization { .. })
        ));
    }

    #[test]
    fn truncated_meta_counter_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(&dir.path().join("k.redb")).unwrap();
        {
            let txn = store.db.begin_write().unwrap();
            {
                let mut table = txn.open_table(META_TABLE).unwrap();
                table.insert(LAST_ITERATION, [1u8, 2].as_slice()).unwrap();
            }
            txn.commit().unwrap();
        }
        assert!(matches!(
            store.load_all(),
            Err(StoreError::Serialization { .. })
        ));
    }
}
