//! Multi-pass symbolic inference over the current token graph.
//!
//! Four independent, read-only passes each derive a family of records:
//!
//! | Pass | Combinator | Derives |
//! |------|------------|---------|
//! | 1 | `I` | every node is `observed` |
//! | 2 | `K(degree > avg)` | nodes above average degree are `hub`s |
//! | 3 | `S(neighbors)(weight)` | every edge as `connects` |
//! | 4 | `W(iteration mod n)` | one node's neighbors as weighted `explores` |
//!
//! Records are ephemeral: they are recomputed from the graph each iteration and
//! only ever reported, never written to the knowledge store.

pub mod passes;

use std::fmt;

use serde::Serialize;

use crate::graph::Graph;

/// Which combinator produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Combinator {
    Identity,
    Constant,
    Substitution,
    Walk,
}

impl Combinator {
    pub fn tag(self) -> &'static str {
        match self {
            Combinator::Identity => "I",
            Combinator::Constant => "K(degree > avg)",
            Combinator::Substitution => "S(neighbors)(weight)",
            Combinator::Walk => "W(iteration mod n)",
        }
    }

    pub fn pass(self) -> u8 {
        match self {
            Combinator::Identity => 1,
            Combinator::Constant => 2,
            Combinator::Substitution => 3,
            Combinator::Walk => 4,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Combinator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// A derived fact that lives only for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRecord {
    pub subject: String,
    pub predicate: &'static str,
    pub object: String,
    pub pass: u8,
    pub combinator: Combinator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl InferenceRecord {
    fn new(
        combinator: Combinator,
        subject: impl Into<String>,
        predicate: &'static str,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            pass: combinator.pass(),
            combinator,
            weight: None,
        }
    }

    fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl fmt::Display for InferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.combinator, self.subject, self.predicate, self.object
        )?;
        if let Some(w) = self.weight {
            write!(f, " ({w:.3})")?;
        }
        Ok(())
    }
}

/// Output of all four passes, in pass order.
#[derive(Debug, Clone, Default)]
pub struct Inference {
    pub observed: Vec<InferenceRecord>,
    pub hubs: Vec<InferenceRecord>,
    pub connections: Vec<InferenceRecord>,
    pub explorations: Vec<InferenceRecord>,
}

impl Inference {
    /// Run every pass against `graph` at `iteration`.
    pub fn run(graph: &Graph, iteration: u64) -> Self {
        let inference = Self {
            observed: passes::observe(graph),
            hubs: passes::select_hubs(graph),
            connections: passes::compose_neighbors(graph),
            explorations: passes::weighted_walk(graph, iteration),
        };
        tracing::debug!(
            pass1 = inference.observed.len(),
            pass2 = inference.hubs.len(),
            pass3 = inference.connections.len(),
            pass4 = inference.explorations.len(),
            "inference passes complete"
        );
        inference
    }

    pub fn total(&self) -> usize {
        self.observed.len() + self.hubs.len() + self.connections.len() + self.explorations.len()
    }

    /// Union of all passes, pass 1 first.
    pub fn all(&self) -> impl Iterator<Item = &InferenceRecord> {
        self.observed
            .iter()
            .chain(&self.hubs)
            .chain(&self.connections)
            .chain(&self.explorations)
    }
}
