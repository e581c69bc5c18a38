//! Graph analytics: strongly connected components over the token graph.

use petgraph::algo::tarjan_scc;

use super::Graph;

/// A strongly connected component in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponent {
    /// Member nodes, sorted.
    pub members: Vec<String>,
    /// Whether the component contains a cycle (more than one member, or a self-loop).
    pub cyclic: bool,
}

/// Find strongly connected components. Returns sorted by size desc, then first member.
pub fn strongly_connected_components(graph: &Graph) -> Vec<ConnectedComponent> {
    let g = &graph.graph;
    let mut components: Vec<ConnectedComponent> = tarjan_scc(g)
        .into_iter()
        .map(|nodes| {
            let cyclic = nodes.len() > 1 || g.contains_edge(nodes[0], nodes[0]);
            let mut members: Vec<String> = nodes.iter().map(|&n| g[n].clone()).collect();
            members.sort();
            ConnectedComponent { members, cyclic }
        })
        .collect();
    components.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| a.members.cmp(&b.members))
    });
    components
}

/// Number of components that contain at least one cycle.
pub fn cycle_count(graph: &Graph) -> usize {
    strongly_connected_components(graph)
        .iter()
        .filter(|c| c.cyclic)
        .count()
}
