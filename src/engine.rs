//! Engine facade: top-level API for the ski-loop system.
//!
//! The `Engine` owns a knowledge store handle and a configuration. Each call to
//! [`Engine::step`] loads the complete history, runs one pure iteration over it,
//! and writes the merged snapshot back before returning. `step` takes `&mut self`,
//! so one engine can never interleave two iterations.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::{SkiResult, StoreError};
use crate::pipeline::{IterationOutput, run_iteration};
use crate::store::{DurableStore, KnowledgeStore, MemStore, Snapshot};

/// The ski-loop engine.
pub struct Engine {
    config: EngineConfig,
    store: Box<dyn KnowledgeStore>,
    persistent: bool,
}

impl Engine {
    /// Create an engine over an arbitrary store.
    pub fn with_store(store: Box<dyn KnowledgeStore>, config: EngineConfig) -> SkiResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            persistent: false,
        })
    }

    /// Create an engine whose history lives only in memory.
    pub fn in_memory(config: EngineConfig) -> SkiResult<Self> {
        Self::with_store(Box::new(MemStore::new()), config)
    }

    /// Open (or create) a redb-backed engine at `path`.
    pub fn open(path: &Path, config: EngineConfig) -> SkiResult<Self> {
        config.validate()?;
        let store = DurableStore::open(path)?;
        tracing::info!(path = %path.display(), "initializing ski-loop engine");
        Ok(Self {
            config,
            store: Box::new(store),
            persistent: true,
        })
    }

    /// Run one iteration.
    ///
    /// With `iteration = None` the engine continues from the stored history:
    /// the last recorded iteration plus one (1 on an empty store).
    pub fn step(&mut self, input: &str, iteration: Option<u64>) -> SkiResult<IterationOutput> {
        let previous = self.store.load_all()?;
        let iteration = match iteration {
            Some(n) => n,
            None => previous.last_iteration.checked_add(1).ok_or(
                StoreError::IterationOverflow {
                    last_iteration: previous.last_iteration,
                },
            )?,
        };
        let (next, output) = run_iteration(&previous, input, iteration, &self.config)?;
        self.store.write_all(&next)?;
        Ok(output)
    }

    /// The complete stored history.
    pub fn snapshot(&self) -> SkiResult<Snapshot> {
        Ok(self.store.load_all()?)
    }

    /// Summary of the stored history.
    pub fn info(&self) -> SkiResult<EngineInfo> {
        let snapshot = self.store.load_all()?;
        Ok(EngineInfo {
            last_iteration: snapshot.last_iteration,
            atomic_count: snapshot.atomics.len(),
            triple_count: snapshot.triples.len(),
            max_count: snapshot.atomics.values().map(|a| a.count).max().unwrap_or(0),
            persistent: self.persistent,
        })
    }
}

/// Summary information about the stored history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub last_iteration: u64,
    pub atomic_count: usize,
    pub triple_count: usize,
    pub max_count: u64,
    pub persistent: bool,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ski-loop engine info")?;
        writeln!(f, "  last iteration: {}", self.last_iteration)?;
        writeln!(f, "  atomics:        {}", self.atomic_count)?;
        writeln!(f, "  triples:        {}", self.triple_count)?;
        writeln!(f, "  max count:      {}", self.max_count)?;
        writeln!(f, "  persistent:     {}", self.persistent)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("persistent", &self.persistent)
            .finish()
    }
}
