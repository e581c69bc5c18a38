//! Token graph rebuilt from the accumulated triples every iteration.
//!
//! Nodes are token strings (and `a_b` compounds when trigram edges are in
//! scope). Neighbor lists are distinct and kept in first-observed order; node
//! lists are sorted, so every indexed access over the graph is reproducible.
//! Self-loops and cycles are ordinary.

pub mod analytics;
pub mod reach;

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::config::AdjacencyScope;
use crate::ngram::Triple;

/// Lower bound on a normalized node weight.
pub const MIN_NODE_WEIGHT: f64 = 0.001;

/// Sort triples chronologically (iteration, then position, then predicate).
pub fn chronological<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> Vec<&'a Triple> {
    let mut sorted: Vec<&Triple> = triples.into_iter().collect();
    sorted.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    sorted
}

/// Directed token graph backed by petgraph.
///
/// Holds at most one edge per ordered node pair. The name index is a sorted
/// map, and every indexed walk over the nodes goes through it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes carry their token, edges carry nothing.
    graph: DiGraph<String, ()>,
    /// Token to NodeIndex, in lexicographic order.
    node_index: BTreeMap<String, NodeIndex>,
}

impl Graph {
    /// Build from triples, keeping only predicates inside `scope`.
    pub fn build<'a>(triples: impl IntoIterator<Item = &'a Triple>, scope: AdjacencyScope) -> Self {
        let mut graph = Graph::default();
        for triple in chronological(triples) {
            if scope == AdjacencyScope::FollowsOnly && !triple.is_follows() {
                continue;
            }
            let s = graph.ensure_node(&triple.subject);
            let o = graph.ensure_node(&triple.object);
            graph.graph.update_edge(s, o, ());
        }
        graph
    }

    fn ensure_node(&mut self, token: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(token) {
            return idx;
        }
        let idx = self.graph.add_node(token.to_string());
        self.node_index.insert(token.to_string(), idx);
        idx
    }

    /// Adjacent tokens in one direction, oldest edge first.
    fn adjacent(&self, node: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(node) else {
            return Vec::new();
        };
        // petgraph yields the most recently added edge first.
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.reverse();
        out
    }

    fn count(&self, node: &str, direction: Direction) -> usize {
        self.node_index
            .get(node)
            .map_or(0, |&idx| self.graph.neighbors_directed(idx, direction).count())
    }

    /// All nodes, lexicographically sorted.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.node_index.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_index.is_empty()
    }

    /// Number of distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.node_index.contains_key(node)
    }

    /// Distinct successors of `node` in first-observed order (empty for unknown nodes).
    pub fn neighbors(&self, node: &str) -> Vec<&str> {
        self.adjacent(node, Direction::Outgoing)
    }

    /// Distinct predecessors of `node` in first-observed order.
    pub fn predecessors(&self, node: &str) -> Vec<&str> {
        self.adjacent(node, Direction::Incoming)
    }

    pub fn degree(&self, node: &str) -> usize {
        self.count(node, Direction::Outgoing)
    }

    pub fn in_degree(&self, node: &str) -> usize {
        self.count(node, Direction::Incoming)
    }

    /// Mean out-degree over all nodes; 0.0 for an empty graph.
    pub fn avg_degree(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.edge_count() as f64 / self.node_count() as f64
    }

    /// Nodes whose degree strictly exceeds the average, sorted.
    pub fn hubs(&self) -> Vec<&str> {
        let avg = self.avg_degree();
        self.nodes()
            .filter(|n| self.degree(n) as f64 > avg)
            .collect()
    }

    /// Sum of `degree + in_degree` over all nodes: every edge counts at both ends.
    pub fn total_weight(&self) -> usize {
        2 * self.edge_count()
    }

    /// `(degree + in_degree) / total_weight`, never below [`MIN_NODE_WEIGHT`].
    pub fn node_weight(&self, node: &str) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            return MIN_NODE_WEIGHT;
        }
        let w = (self.degree(node) + self.in_degree(node)) as f64 / total as f64;
        w.max(MIN_NODE_WEIGHT)
    }

    /// Nodes with at least one successor, sorted.
    pub fn sources(&self) -> Vec<&str> {
        self.nodes().filter(|n| self.degree(n) > 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::{FOLLOWS, LEADS_TO};

    fn follows(s: &str, o: &str, iteration: u64, position: usize) -> Triple {
        Triple::new(s, FOLLOWS, o, iteration, position)
    }

    #[test]
    fn empty_graph_guards() {
        let g = Graph::build(std::iter::empty(), AdjacencyScope::AllPredicates);
        assert!(g.is_empty());
        assert_eq!(g.avg_degree(), 0.0);
        assert!(g.hubs().is_empty());
        assert_eq!(g.node_weight("ghost"), MIN_NODE_WEIGHT);
        assert!(g.neighbors("ghost").is_empty());
    }

    #[test]
    fn degrees_and_distinct_neighbors() {
        let triples = vec![
            follows("a", "b", 1, 0),
            follows("a", "b", 2, 0),
            follows("a", "c", 2, 1),
            follows("c", "a", 3, 0),
        ];
        let g = Graph::build(&triples, AdjacencyScope::AllPredicates);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors("a"), ["b", "c"]);
        assert_eq!(g.degree("b"), 0);
        assert_eq!(g.in_degree("a"), 1);
        assert_eq!(g.predecessors("b"), ["a"]);
        assert!((g.avg_degree() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn neighbors_follow_chronology_not_key_order() {
        // Iteration 10 sorts before iteration 2 as a string key.
        let triples = vec![follows("x", "late", 10, 0), follows("x", "early", 2, 0)];
        let g = Graph::build(&triples, AdjacencyScope::AllPredicates);
        assert_eq!(g.neighbors("x"), ["early", "late"]);
    }

    #[test]
    fn repeated_edges_keep_first_seen_order() {
        let triples = vec![
            follows("hub", "one", 1, 0),
            follows("hub", "two", 1, 1),
            follows("hub", "one", 2, 0),
            follows("hub", "three", 2, 1),
            follows("two", "hub", 3, 0),
        ];
        let g = Graph::build(&triples, AdjacencyScope::AllPredicates);
        assert_eq!(g.neighbors("hub"), ["one", "two", "three"]);
        assert_eq!(g.predecessors("hub"), ["two"]);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.nodes().collect::<Vec<_>>(), ["hub", "one", "three", "two"]);
    }

    #[test]
    fn scope_filters_trigram_edges() {
        let triples = vec![
            follows("a", "b", 1, 0),
            follows("b", "c", 1, 1),
            Triple::new("a_b", LEADS_TO, "c", 1, 0),
        ];
        let all = Graph::build(&triples, AdjacencyScope::AllPredicates);
        let seq = Graph::build(&triples, AdjacencyScope::FollowsOnly);
        assert!(all.contains("a_b"));
        assert!(!seq.contains("a_b"));
        assert_eq!(all.in_degree("c"), 2);
        assert_eq!(seq.in_degree("c"), 1);
    }

    #[test]
    fn hub_requires_strictly_greater_degree() {
        // Two-cycle: both nodes sit exactly on the average.
        let cycle = vec![follows("a", "b", 1, 0), follows("b", "a", 1, 1)];
        let g = Graph::build(&cycle, AdjacencyScope::AllPredicates);
        assert!(g.hubs().is_empty());

        let mut with_hub = cycle.clone();
        with_hub.push(follows("c", "a", 2, 0));
        with_hub.push(follows("c", "b", 2, 1));
        let g = Graph::build(&with_hub, AdjacencyScope::AllPredicates);
        assert_eq!(g.hubs(), vec!["c"]);
    }

    #[test]
    fn node_weights_are_normalized() {
        let triples = vec![follows("a", "b", 1, 0), follows("b", "c", 1, 1)];
        let g = Graph::build(&triples, AdjacencyScope::AllPredicates);
        assert_eq!(g.total_weight(), 4);
        assert!((g.node_weight("b") - 0.5).abs() < 1e-12);
        assert!((g.node_weight("a") - 0.25).abs() < 1e-12);
        assert_eq!(g.node_weight("missing"), MIN_NODE_WEIGHT);
    }

    #[test]
    fn self_loop_counts_both_ways() {
        let g = Graph::build(&[follows("go", "go", 1, 0)], AdjacencyScope::AllPredicates);
        assert_eq!(g.degree("go"), 1);
        assert_eq!(g.in_degree("go"), 1);
        assert_eq!(g.sources(), vec!["go"]);
    }
}
