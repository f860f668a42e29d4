//! ICS header line tokenizing and key/value classification

use crate::ics::vocabulary::{vocabulary, Vocabulary};

/// Splits a header line into trimmed, non-empty tokens
///
/// Lines containing a tab are split on tabs only, all others on spaces.
pub fn tokenize(line: &str) -> Vec<&str> {
    let separator = if line.contains('\t') { '\t' } else { ' ' };
    line.split(separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Splits tokens into a key and a value using the embedded vocabulary
///
/// Leading keyword tokens form the key; the first non-keyword token and
/// everything after it form the value. Returns `None` when no value token
/// exists.
pub fn classify(tokens: &[&str]) -> Option<(String, String)> {
    classify_with(vocabulary(), tokens)
}

/// [`classify`] against an explicit vocabulary
pub fn classify_with(vocabulary: &Vocabulary, tokens: &[&str]) -> Option<(String, String)> {
    let split = tokens.iter().position(|token| !vocabulary.is_keyword(token))?;
    let key = tokens[..split].join(" ");
    let value = tokens[split..].join(" ");
    Some((key, value))
}
