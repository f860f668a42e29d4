//! ICS header keyword vocabulary
//!
//! The category lists live in `ics_vocabulary.toml` at the crate root and
//! are parsed once on first use.

use lazy_static::lazy_static;
use log::warn;

use crate::format::errors::{FormatError, FormatResult};

lazy_static! {
    static ref VOCABULARY: Vocabulary = {
        let content = include_str!("../../ics_vocabulary.toml");
        Vocabulary::from_str(content).unwrap_or_else(|e| {
            warn!("Failed to parse ICS vocabulary: {}", e);
            Vocabulary::default()
        })
    };
}

/// Keyword lists that make up header keys
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub sub_sub_categories: Vec<String>,
}

impl Vocabulary {
    /// Parse the vocabulary from a TOML string
    pub fn from_str(content: &str) -> FormatResult<Self> {
        let value: toml::Value = content
            .parse()
            .map_err(|e| FormatError::GenericError(format!("Failed to parse TOML: {}", e)))?;

        let list = |name: &str| -> Vec<String> {
            value
                .get(name)
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        Ok(Vocabulary {
            categories: list("categories"),
            sub_categories: list("sub_categories"),
            sub_sub_categories: list("sub_sub_categories"),
        })
    }

    /// Whether any entry of any list matches the token
    pub fn is_keyword(&self, token: &str) -> bool {
        self.categories
            .iter()
            .chain(self.sub_categories.iter())
            .chain(self.sub_sub_categories.iter())
            .any(|entry| matches(entry, token))
    }
}

/// The embedded vocabulary
pub fn vocabulary() -> &'static Vocabulary {
    &VOCABULARY
}

/// Matches a token against one vocabulary entry
///
/// Equal ignoring case, or, for entries ending in `*`, the token starts with
/// the entry's prefix (case-sensitive).
pub fn matches(entry: &str, token: &str) -> bool {
    if token.eq_ignore_ascii_case(entry) {
        return true;
    }
    match entry.strip_suffix('*') {
        Some(prefix) => token.starts_with(prefix),
        None => false,
    }
}
