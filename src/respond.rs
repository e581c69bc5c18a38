//! Response composer: the human-readable summary of one iteration.

use crate::generate::Generation;
use crate::infer::Inference;
use crate::markov::MarkovModel;

/// Emitted when there is neither input nor history.
pub const WAITING: &str = "Waiting for input...";

/// Compose the response text.
///
/// With input: learned tokens, transition count, generated text, inference
/// breakdown. Without input but with history: transitions and generation only.
/// With neither: [`WAITING`].
pub fn compose(
    tokens: &[String],
    has_history: bool,
    model: &MarkovModel,
    generation: &Generation,
    inference: &Inference,
) -> String {
    if tokens.is_empty() && !has_history {
        return WAITING.to_string();
    }

    let mut lines = Vec::new();
    if !tokens.is_empty() {
        lines.push(format!("I learned: {}.", tokens.join(", ")));
    }
    lines.push(format!(
        "I know continuations for {} word{}.",
        model.word_count(),
        if model.word_count() == 1 { "" } else { "s" }
    ));
    if !generation.generated_text.is_empty() {
        lines.push(format!("I say: \"{}\"", generation.generated_text));
    }
    if !tokens.is_empty() {
        lines.push(format!(
            "Inferred {} facts: {} observed, {} hubs, {} connections, {} explorations.",
            inference.total(),
            inference.observed.len(),
            inference.hubs.len(),
            inference.connections.len(),
            inference.explorations.len(),
        ));
    }
    lines.join("\n")
}
