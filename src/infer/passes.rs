//! The four inference passes. Each reads the graph only and walks nodes in
//! sorted order, so identical graphs give identical output.

use crate::graph::Graph;

use super::{Combinator, InferenceRecord};

/// Pass 1: one `observed` record per node.
pub fn observe(graph: &Graph) -> Vec<InferenceRecord> {
    graph
        .nodes()
        .map(|n| InferenceRecord::new(Combinator::Identity, n, "observed", "pass1"))
        .collect()
}

/// Pass 2: nodes whose degree is strictly above the graph average.
pub fn select_hubs(graph: &Graph) -> Vec<InferenceRecord> {
    graph
        .hubs()
        .into_iter()
        .map(|n| InferenceRecord::new(Combinator::Constant, n, "hub", "high_degree"))
        .collect()
}

/// Pass 3: one `connects` record per edge.
pub fn compose_neighbors(graph: &Graph) -> Vec<InferenceRecord> {
    graph
        .nodes()
        .flat_map(|node| {
            graph
                .neighbors(node)
                .into_iter()
                .map(move |n| InferenceRecord::new(Combinator::Substitution, node, "connects", n))
        })
        .collect()
}

/// Pass 4: pick node `iteration mod node_count` and explore its neighbors,
/// each weighted by its normalized degree.
pub fn weighted_walk(graph: &Graph, iteration: u64) -> Vec<InferenceRecord> {
    let Some(current) = pick(graph, iteration) else {
        return Vec::new();
    };
    graph
        .neighbors(current)
        .into_iter()
        .map(|n| {
            InferenceRecord::new(Combinator::Walk, current, "explores", n)
                .with_weight(graph.node_weight(n))
        })
        .collect()
}

/// The node at index `iteration mod node_count` in sorted order.
pub fn pick(graph: &Graph, iteration: u64) -> Option<&str> {
    let count = graph.node_count() as u64;
    if count == 0 {
        return None;
    }
    graph.nodes().nth((iteration % count) as usize)
}
