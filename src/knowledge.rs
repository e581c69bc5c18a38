//! Atomics: accumulated fact counts and their recency-weighted confidence.
//!
//! An atomic is keyed by its fact string (`"hello follows world"`). Counts only
//! ever grow. Confidence is never carried forward: it is recomputed for the
//! whole store every iteration from the counts, the current maximum count, and
//! how many iterations have passed since each fact was last seen.
//!
//! ```text
//! confidence = min(0.99, count / (max_count + 1) * (1 - Δiteration * decay))
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfidenceFloor, EngineConfig};
use crate::ngram::TripleMap;

/// Upper bound on any confidence.
pub const CONFIDENCE_CAP: f64 = 0.99;
/// Lower bound on the decay term under [`ConfidenceFloor::Epsilon`].
pub const DECAY_FLOOR: f64 = 0.001;

/// A normalized fact with its accumulated statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atomic {
    /// Total occurrences across all iterations.
    pub count: u64,
    /// Derived each iteration; never read back as history.
    pub confidence: f64,
    /// Iteration at which the fact was last observed.
    pub iteration: u64,
}

/// Atomics keyed by fact string.
pub type AtomicMap = BTreeMap<String, Atomic>;

/// Occurrences of each fact among this iteration's new triples.
pub fn occurrences(new_triples: &TripleMap) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for triple in new_triples.values() {
        *counts.entry(triple.fact()).or_insert(0) += 1;
    }
    counts
}

/// Add this iteration's occurrences onto the existing counts.
///
/// Touched facts have their `iteration` refreshed; untouched facts are carried
/// over unchanged. Confidences are left for [`compute_confidence`].
pub fn merge_atomics(
    existing: &AtomicMap,
    occurrences: &BTreeMap<String, u64>,
    iteration: u64,
) -> AtomicMap {
    let mut merged = existing.clone();
    for (fact, &seen) in occurrences {
        let atomic = merged.entry(fact.clone()).or_insert(Atomic {
            count: 0,
            confidence: 0.0,
            iteration,
        });
        atomic.count += seen;
        atomic.iteration = iteration;
    }
    merged
}

/// Confidence of a single fact given the store-wide maximum count.
pub fn confidence(
    count: u64,
    max_count: u64,
    last_seen: u64,
    iteration: u64,
    config: &EngineConfig,
) -> f64 {
    let frequency = count as f64 / (max_count as f64 + 1.0);
    let elapsed = iteration.saturating_sub(last_seen) as f64;
    let decay = 1.0 - elapsed * config.decay_per_iteration;
    match config.confidence_floor {
        ConfidenceFloor::Epsilon => (frequency * decay.max(DECAY_FLOOR)).min(CONFIDENCE_CAP),
        ConfidenceFloor::Zero => (frequency * decay).clamp(0.0, CONFIDENCE_CAP),
    }
}

/// Recompute every atomic's confidence at `iteration`.
///
/// Pure: the same counts and iteration always give the same confidences.
pub fn compute_confidence(atomics: &AtomicMap, iteration: u64, config: &EngineConfig) -> AtomicMap {
    let max_count = atomics.values().map(|a| a.count).max().unwrap_or(0);
    atomics
        .iter()
        .map(|(fact, atomic)| {
            let c = confidence(atomic.count, max_count, atomic.iteration, iteration, config);
            (
                fact.clone(),
                Atomic {
                    confidence: c,
                    ..atomic.clone()
                },
            )
        })
        .collect()
}
