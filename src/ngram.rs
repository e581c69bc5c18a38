//! N-gram extraction: positional bigram and trigram triples.
//!
//! Every adjacent pair becomes a `follows` triple and every window of three
//! becomes a `leads_to` triple whose subject is the compound `a_b`. Keys carry
//! the iteration and position, so a pair repeated within one input, or across
//! iterations, is stored as a distinct triple.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Predicate for direct sequential adjacency of two tokens.
pub const FOLLOWS: &str = "follows";
/// Predicate for a trigram: compound of two tokens leads to the third.
pub const LEADS_TO: &str = "leads_to";

/// A positional relation observed in some input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    /// Iteration in which the relation was observed.
    pub iteration: u64,
    /// Token index of the window start within that iteration's input.
    pub position: usize,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        iteration: u64,
        position: usize,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            iteration,
            position,
        }
    }

    /// Unique store key: one per (iteration, position, relation).
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{} {} {}",
            self.iteration, self.position, self.subject, self.predicate, self.object
        )
    }

    /// The normalized fact string this relation contributes to, e.g.
    /// `"hello follows world"`.
    pub fn fact(&self) -> String {
        format!("{} {} {}", self.subject, self.predicate, self.object)
    }

    /// Chronological sort key, independent of how store keys collate.
    pub fn order_key(&self) -> (u64, usize, &str) {
        (self.iteration, self.position, self.predicate.as_str())
    }

    pub fn is_follows(&self) -> bool {
        self.predicate == FOLLOWS
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// Triples keyed by [`Triple::key`].
pub type TripleMap = BTreeMap<String, Triple>;

/// One `follows` triple per adjacent token pair.
pub fn bigrams(tokens: &[String], iteration: u64) -> TripleMap {
    tokens
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let t = Triple::new(&w[0], FOLLOWS, &w[1], iteration, i);
            (t.key(), t)
        })
        .collect()
}

/// One `leads_to` triple per window of three tokens.
pub fn trigrams(tokens: &[String], iteration: u64) -> TripleMap {
    tokens
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            let t = Triple::new(format!("{}_{}", w[0], w[1]), LEADS_TO, &w[2], iteration, i);
            (t.key(), t)
        })
        .collect()
}

/// All new triples for this iteration, not yet merged with history.
pub fn extract(tokens: &[String], iteration: u64) -> TripleMap {
    let mut triples = bigrams(tokens, iteration);
    triples.extend(trigrams(tokens, iteration));
    triples
}
