//! # Qualifier Tokenizer
//!
//! Splits a human-typed search string such as
//! `websocket in:name,desc downloads:>=1000` into a free-text term and a set
//! of `key:value` qualifiers.
//!
//! Spaces inside qualifier values are encoded by the client as `+`
//! (`location:San+Francisco`). Tokenizing happens on the encoded form;
//! [`decode_value`] restores the spaces afterwards.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static QUALIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):(.+)$").expect("Qualifier regex should compile - static pattern")
});

/// A tokenized search string.
///
/// Qualifier keys are stored lowercase. Qualifiers keep the order in which
/// the caller wrote them, and a repeated key, in any case, keeps its first
/// position but takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub qualifiers: IndexMap<String, String>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            qualifiers: IndexMap::new(),
        }
    }

    /// Add or replace a qualifier.
    pub fn with_qualifier(mut self, key: &str, value: impl Into<String>) -> Self {
        self.qualifiers.insert(key.to_lowercase(), value.into());
        self
    }

    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .get(key.to_lowercase().as_str())
            .map(String::as_str)
    }

    /// True when neither a term nor any qualifier is present.
    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty() && self.qualifiers.is_empty()
    }

    /// Render the qualifiers back into `key:value` tokens joined by spaces.
    pub fn to_query_string(&self) -> String {
        self.qualifiers
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a raw query string into free text and qualifiers.
///
/// Every whitespace-separated token of the form `key:value` becomes a
/// qualifier. All other tokens are joined, in order, into the free-text term.
pub fn tokenize(raw: &str) -> SearchQuery {
    let mut terms = Vec::new();
    let mut qualifiers = IndexMap::new();

    for token in raw.split_whitespace() {
        match QUALIFIER_REGEX.captures(token) {
            Some(caps) => {
                qualifiers.insert(caps[1].to_lowercase(), caps[2].to_string());
            }
            None => terms.push(token),
        }
    }

    SearchQuery {
        term: terms.join(" "),
        qualifiers,
    }
}

/// Turn `+` placeholders back into spaces.
pub fn decode_value(value: &str) -> String {
    value.replace('+', " ")
}
