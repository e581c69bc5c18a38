//! Backward pass: synthesize a short continuation from accumulated history.
//!
//! The seed is drawn from graph centrality (any node with outgoing edges),
//! indexed by the iteration number. Each later step strides through the
//! current word's successor list by `iteration * prime`, with a different
//! prime per step so consecutive choices do not move in lockstep. The walk
//! stops at the first word without successors.

use serde::Serialize;

use crate::graph::Graph;
use crate::markov::MarkovModel;

/// Result of one backward pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub seed_token: String,
    pub generated_tokens: Vec<String>,
    pub generated_text: String,
}

impl Generation {
    pub fn is_empty(&self) -> bool {
        self.generated_tokens.is_empty()
    }
}

/// Choose the seed token.
///
/// Candidates are nodes with degree > 0 in sorted order; the seed is
/// `candidates[iteration mod len]`. With no candidates, fall back to the first
/// input token, then to the empty string.
pub fn select_seed(graph: &Graph, iteration: u64, input_tokens: &[String]) -> String {
    let pool = graph.sources();
    if pool.is_empty() {
        return input_tokens.first().cloned().unwrap_or_default();
    }
    let idx = (iteration % pool.len() as u64) as usize;
    pool[idx].to_string()
}

/// Walk the Markov model from `seed`, one step per prime.
pub fn walk(model: &MarkovModel, seed: &str, iteration: u64, primes: &[u64]) -> Vec<String> {
    if seed.is_empty() {
        return Vec::new();
    }
    let mut tokens = vec![seed.to_string()];
    for &prime in primes {
        let Some(previous) = tokens.last() else {
            break;
        };
        let candidates = model.successors(previous);
        if candidates.is_empty() {
            break;
        }
        let idx = (iteration.wrapping_mul(prime) % candidates.len() as u64) as usize;
        tokens.push(candidates[idx].clone());
    }
    tokens
}

/// Seed selection followed by the walk.
pub fn generate(
    graph: &Graph,
    model: &MarkovModel,
    iteration: u64,
    input_tokens: &[String],
    primes: &[u64],
) -> Generation {
    let seed_token = select_seed(graph, iteration, input_tokens);
    let generated_tokens = walk(model, &seed_token, iteration, primes);
    let generated_text = generated_tokens.join(" ");
    tracing::debug!(seed = %seed_token, tokens = generated_tokens.len(), "generated continuation");
    Generation {
        seed_token,
        generated_tokens,
        generated_text,
    }
}
