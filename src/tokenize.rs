//! Tokenizer: normalize one line of raw input into an ordered token sequence.
//!
//! Normalization: NFC, lowercase, strip `! ? . ,`,
//! collapse double spaces once, split on a single space. Longer runs of spaces
//! leave empty fragments behind, and those are dropped by the final filter.

use unicode_normalization::UnicodeNormalization;

/// Punctuation removed before splitting.
const STRIPPED: [char; 4] = ['!', '?', '.', ','];

/// Split raw text into lowercase tokens. Never fails; degenerate input yields
/// an empty vector.
pub fn tokenize(input: &str) -> Vec<String> {
    let composed: String = input.nfc().collect();
    let normalized = composed.to_lowercase().replace(STRIPPED, "");

    normalized
        .replace("  ", " ")
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
