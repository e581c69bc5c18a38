//! First-order Markov transitions over `follows` edges.
//!
//! Successor lists are distinct and in first-observed order. Probabilities are
//! raw relative frequencies with no smoothing; a word with no observed
//! successor is simply absent.

use std::collections::BTreeMap;

use crate::graph::chronological;
use crate::ngram::Triple;

/// Per-word successor lists and transition probabilities.
#[derive(Debug, Clone, Default)]
pub struct MarkovModel {
    transitions: BTreeMap<String, Vec<String>>,
    probabilities: BTreeMap<String, BTreeMap<String, f64>>,
    edge_count: usize,
}

/// The `follows` triples, chronologically ordered.
pub fn follow_edges<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> Vec<&'a Triple> {
    chronological(triples.into_iter().filter(|t| t.is_follows()))
}

impl MarkovModel {
    /// Build from every accumulated triple; non-`follows` predicates are ignored.
    pub fn build<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> Self {
        let edges = follow_edges(triples);
        let mut transitions: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();

        for edge in &edges {
            let successors = transitions.entry(edge.subject.clone()).or_default();
            if !successors.contains(&edge.object) {
                successors.push(edge.object.clone());
            }
            *counts
                .entry(edge.subject.as_str())
                .or_default()
                .entry(edge.object.as_str())
                .or_insert(0) += 1;
        }

        let probabilities = counts
            .into_iter()
            .map(|(word, successors)| {
                let total: usize = successors.values().sum();
                let probs = successors
                    .into_iter()
                    .map(|(next, n)| (next.to_string(), n as f64 / total.max(1) as f64))
                    .collect();
                (word.to_string(), probs)
            })
            .collect();

        Self {
            transitions,
            probabilities,
            edge_count: edges.len(),
        }
    }

    /// Distinct successors of `word`; empty when it has none.
    pub fn successors(&self, word: &str) -> &[String] {
        self.transitions.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `P(next | word)`, if `word` has been seen with successors.
    pub fn probabilities(&self, word: &str) -> Option<&BTreeMap<String, f64>> {
        self.probabilities.get(word)
    }

    /// Number of words with at least one successor.
    pub fn word_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of `follows` observations the model was built from.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Words with more than one distinct successor.
    pub fn branching(&self) -> BTreeMap<String, Vec<String>> {
        self.transitions
            .iter()
            .filter(|(_, next)| next.len() > 1)
            .map(|(w, next)| (w.clone(), next.clone()))
            .collect()
    }
}
