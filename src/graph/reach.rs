//! Depth-limited reachability and influence scoring.
//!
//! `reach_1[n]` is the neighbor list of `n`; `reach_k+1[n]` adds the neighbors
//! of everything in `reach_k[n]`. A node's influence is the size of its
//! reachable set at the configured depth. Cycles can make a node reach itself.

use std::collections::{BTreeMap, HashSet};

use crate::error::GraphError;

use super::Graph;

/// Deepest supported expansion.
pub const MAX_REACH_DEPTH: usize = 6;

pub type ReachResult<T> = std::result::Result<T, GraphError>;

fn check_depth(depth: usize) -> ReachResult<()> {
    if (1..=MAX_REACH_DEPTH).contains(&depth) {
        Ok(())
    } else {
        Err(GraphError::DepthOutOfRange {
            depth,
            max_depth: MAX_REACH_DEPTH,
        })
    }
}

/// Distinct nodes reachable from `start` within `depth` hops, in discovery order.
pub fn reachable(graph: &Graph, start: &str, depth: usize) -> ReachResult<Vec<String>> {
    check_depth(depth)?;

    let mut found: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut frontier: Vec<&str> = Vec::new();

    for n in graph.neighbors(start) {
        if seen.insert(n) {
            found.push(n.to_string());
            frontier.push(n);
        }
    }

    for _ in 1..depth {
        let mut next = Vec::new();
        for node in frontier {
            for n in graph.neighbors(node) {
                if seen.insert(n) {
                    found.push(n.to_string());
                    next.push(n);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    Ok(found)
}

/// Influence score (reachable-set size) for every node.
pub fn influence_scores(graph: &Graph, depth: usize) -> ReachResult<BTreeMap<String, usize>> {
    check_depth(depth)?;
    graph
        .nodes()
        .map(|n| Ok((n.to_string(), reachable(graph, n, depth)?.len())))
        .collect()
}

/// The `k` most influential nodes, score descending, ties by name.
pub fn top_influence(scores: &BTreeMap<String, usize>, k: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = scores
        .iter()
        .map(|(n, &s)| (n.clone(), s))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdjacencyScope;
    use crate::ngram::{FOLLOWS, Triple};

    fn chain() -> Graph {
        // a -> b -> c -> d -> e
        let words = ["a", "b", "c", "d", "e"];
        let triples: Vec<Triple> = words
            .windows(2)
            .enumerate()
            .map(|(i, w)| Triple::new(w[0], FOLLOWS, w[1], 1, i))
            .collect();
        Graph::build(&triples, AdjacencyScope::AllPredicates)
    }

    #[test]
    fn depth_limits_expansion() {
        let g = chain();
        assert_eq!(reachable(&g, "a", 1).unwrap(), vec!["b"]);
        assert_eq!(reachable(&g, "a", 2).unwrap(), vec!["b", "c"]);
        assert_eq!(reachable(&g, "a", 3).unwrap(), vec!["b", "c", "d"]);
        assert_eq!(reachable(&g, "a", 6).unwrap().len(), 4);
    }

    #[test]
    fn influence_at_depth_three() {
        let scores = influence_scores(&chain(), 3).unwrap();
        assert_eq!(scores["a"], 3);
        assert_eq!(scores["c"], 2);
        assert_eq!(scores["e"], 0);
        let top = top_influence(&scores, 2);
        assert_eq!(top, vec![("a".to_string(), 3), ("b".to_string(), 3)]);
    }

    #[test]
    fn cycle_reaches_itself() {
        let triples = vec![
            Triple::new("x", FOLLOWS, "y", 1, 0),
            Triple::new("y", FOLLOWS, "x", 1, 1),
        ];
        let g = Graph::build(&triples, AdjacencyScope::AllPredicates);
        assert_eq!(reachable(&g, "x", 3).unwrap(), vec!["y", "x"]);
    }

    #[test]
    fn depth_out_of_range() {
        let g = chain();
        assert!(matches!(
            reachable(&g, "a", 0),
            Err(GraphError::DepthOutOfRange { depth: 0, .. })
        ));
        assert!(influence_scores(&g, MAX_REACH_DEPTH + 1).is_err());
    }

    #[test]
    fn unknown_node_reaches_nothing() {
        assert!(reachable(&chain(), "zzz", 3).unwrap().is_empty());
    }
}
