//! One iteration as a pure function of (snapshot, input, iteration).
//!
//! ```text
//! text ─► tokenize ─► n-grams ─► merge atomics ─► confidence
//!                                     │
//!             all triples ◄───────────┘
//!                 │
//!                 ├─► graph ─► inference passes, reachability, SCCs
//!                 └─► markov ─┐
//!                   graph ────┴─► generate ─► compose response
//! ```
//!
//! Nothing here touches a store; [`crate::engine::Engine`] does the load and
//! write around [`run_iteration`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::SkiResult;
use crate::generate::{self, Generation};
use crate::graph::{Graph, analytics, reach};
use crate::infer::{Inference, InferenceRecord};
use crate::knowledge::{self, AtomicMap};
use crate::markov::MarkovModel;
use crate::ngram;
use crate::respond;
use crate::store::Snapshot;
use crate::tokenize::tokenize;

/// Input tokens of this iteration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub input_tokens: Vec<String>,
    pub token_count: usize,
}

/// Markov model statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionReport {
    /// Words with at least one known successor.
    pub total_words: usize,
    /// `follows` observations across all history.
    pub total_edges: usize,
    /// Words with more than one distinct successor.
    pub sample_transitions: BTreeMap<String, Vec<String>>,
}

/// Count and confidence of one fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtomicView {
    pub count: u64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Influence {
    pub node: String,
    pub score: usize,
}

/// Graph statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    pub nodes: usize,
    pub edges: usize,
    pub avg_degree: f64,
    pub high_degree_nodes: Vec<String>,
    /// Strongly connected components containing a cycle.
    pub cycles: usize,
    pub top_influence: Vec<Influence>,
}

/// Inference counts per pass plus a few sample records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceReport {
    pub total_inferred: usize,
    pub pass1: usize,
    pub pass2: usize,
    pub pass3: usize,
    pub pass4: usize,
    pub samples: Vec<InferenceRecord>,
}

/// Everything one iteration exposes to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationOutput {
    pub response: String,
    pub iteration: u64,
    /// Triples extracted from this iteration's input.
    pub new_triples: usize,
    pub tokens: TokenReport,
    pub generated: Generation,
    pub transitions: TransitionReport,
    pub atomics: BTreeMap<String, AtomicView>,
    pub graph: GraphReport,
    pub inference: InferenceReport,
}

fn atomic_views(atomics: &AtomicMap) -> BTreeMap<String, AtomicView> {
    atomics
        .iter()
        .map(|(fact, a)| {
            (
                fact.clone(),
                AtomicView {
                    count: a.count,
                    confidence: a.confidence,
                },
            )
        })
        .collect()
}

/// Run one full iteration.
///
/// Returns the snapshot to persist and the output to show. Identical
/// `(previous, input, iteration, config)` always produce identical results.
pub fn run_iteration(
    previous: &Snapshot,
    input: &str,
    iteration: u64,
    config: &EngineConfig,
) -> SkiResult<(Snapshot, IterationOutput)> {
    // Forward pass: learn.
    let tokens = tokenize(input);
    let new_triples = ngram::extract(&tokens, iteration);
    let occurrences = knowledge::occurrences(&new_triples);
    let merged = knowledge::merge_atomics(&previous.atomics, &occurrences, iteration);
    let atomics = knowledge::compute_confidence(&merged, iteration, config);
    tracing::debug!(
        tokens = tokens.len(),
        new_triples = new_triples.len(),
        facts = atomics.len(),
        "learned from input"
    );

    let new_triple_count = new_triples.len();
    let mut triples = previous.triples.clone();
    triples.extend(new_triples);

    // Derived, never persisted.
    let graph = Graph::build(triples.values(), config.adjacency_scope);
    let model = MarkovModel::build(triples.values());
    let inference = Inference::run(&graph, iteration);
    let scores = reach::influence_scores(&graph, config.reach_depth)?;
    let top_influence = reach::top_influence(&scores, config.influence_top_k)
        .into_iter()
        .map(|(node, score)| Influence { node, score })
        .collect();
    let cycles = analytics::cycle_count(&graph);

    // Backward pass: generate.
    let generated = generate::generate(&graph, &model, iteration, &tokens, &config.walk_primes);

    let response = respond::compose(&tokens, !previous.is_empty(), &model, &generated, &inference);

    let output = IterationOutput {
        response: response.clone(),
        iteration,
        new_triples: new_triple_count,
        tokens: TokenReport {
            token_count: tokens.len(),
            input_tokens: tokens,
        },
        generated,
        transitions: TransitionReport {
            total_words: model.word_count(),
            total_edges: model.edge_count(),
            sample_transitions: model.branching(),
        },
        atomics: atomic_views(&atomics),
        graph: GraphReport {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            avg_degree: graph.avg_degree(),
            high_degree_nodes: graph.hubs().into_iter().map(str::to_string).collect(),
            cycles,
            top_influence,
        },
        inference: InferenceReport {
            total_inferred: inference.total(),
            pass1: inference.observed.len(),
            pass2: inference.hubs.len(),
            pass3: inference.connections.len(),
            pass4: inference.explorations.len(),
            samples: inference
                .all()
                .take(config.inference_sample_limit)
                .cloned()
                .collect(),
        },
    };

    tracing::info!(
        iteration,
        tokens = output.tokens.token_count,
        nodes = output.graph.nodes,
        inferred = output.inference.total_inferred,
        generated = %output.generated.generated_text,
        "iteration complete"
    );

    let snapshot = Snapshot {
        atomics,
        triples,
        last_iteration: iteration,
        last_response: Some(response),
    };
    Ok((snapshot, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_empty_input_waits() {
        let (snap, out) = run_iteration(&Snapshot::default(), "", 1, &EngineConfig::default()).unwrap();
        assert_eq!(out.response, respond::WAITING);
        assert!(out.generated.generated_tokens.is_empty());
        assert!(snap.is_empty());
        assert_eq!(snap.last_iteration, 1);
    }

    #[test]
    fn hello_world_on_empty_store() {
        let (snap, out) =
            run_iteration(&Snapshot::default(), "hello world", 1, &EngineConfig::default()).unwrap();
        assert_eq!(out.new_triples, 1);
        assert_eq!(snap.triples.len(), 1);
        let t = snap.triples.values().next().unwrap();
        assert_eq!((t.subject.as_str(), t.predicate.as_str(), t.object.as_str()), ("hello", "follows", "world"));
        assert_eq!(out.atomics.len(), 1);
        assert_eq!(out.atomics["hello follows world"].count, 1);
        assert_eq!(out.graph.nodes, 2);
        assert_eq!(out.graph.high_degree_nodes, vec!["hello"]);
    }

    #[test]
    fn iteration_is_reproducible() {
        let config = EngineConfig::default();
        let (first, _) = run_iteration(&Snapshot::default(), "the cat sat on the mat", 1, &config).unwrap();
        let (a_snap, a_out) = run_iteration(&first, "the dog sat on the cat", 2, &config).unwrap();
        let (b_snap, b_out) = run_iteration(&first, "the dog sat on the cat", 2, &config).unwrap();
        assert_eq!(a_snap, b_snap);
        assert_eq!(
            serde_json::to_string(&a_out).unwrap(),
            serde_json::to_string(&b_out).unwrap()
        );
    }

    #[test]
    fn samples_are_capped() {
        let config = EngineConfig {
            inference_sample_limit: 3,
            ..Default::default()
        };
        let (_, out) = run_iteration(&Snapshot::default(), "a b c d e f", 1, &config).unwrap();
        assert!(out.inference.total_inferred > 3);
        assert_eq!(out.inference.samples.len(), 3);
    }

    #[test]
    fn invalid_depth_fails_the_iteration() {
        let config = EngineConfig {
            reach_depth: 0,
            ..Default::default()
        };
        assert!(run_iteration(&Snapshot::default(), "a b", 1, &config).is_err());
    }
}
