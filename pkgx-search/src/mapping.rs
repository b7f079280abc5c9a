//! Allowlisted public-to-internal column names.

use crate::clause::Column;
use crate::error::{Result, SearchError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("Identifier regex should compile - static pattern")
});

/// Index-aligned lists of public (API-facing) names and internal column
/// names. Public names are the only vocabulary accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    public: Vec<&'static str>,
    internal: Vec<Column>,
}

impl ColumnMapping {
    /// Build a mapping, checking that both lists line up, that public names
    /// are unique lowercase words and that internal names are plain SQL
    /// identifiers.
    pub fn new(
        entity: &str,
        public: &[&'static str],
        internal: &[&'static str],
    ) -> Result<Self> {
        let invalid = |reason: String| SearchError::InvalidMapping {
            entity: entity.to_string(),
            reason,
        };

        if public.len() != internal.len() {
            return Err(invalid(format!(
                "{} public names but {} internal columns",
                public.len(),
                internal.len()
            )));
        }
        if public.is_empty() {
            return Err(invalid("mapping has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for name in public {
            if name.trim().is_empty() || *name != name.trim().to_lowercase() {
                return Err(invalid(format!(
                    "public name '{}' must be a trimmed lowercase word",
                    name
                )));
            }
            if !seen.insert(*name) {
                return Err(invalid(format!("duplicate public name '{}'", name)));
            }
        }

        for column in internal {
            if !IDENTIFIER_REGEX.is_match(column) {
                return Err(invalid(format!(
                    "internal column '{}' is not a plain identifier",
                    column
                )));
            }
        }

        Ok(Self {
            public: public.to_vec(),
            internal: internal.iter().copied().map(Column::new).collect(),
        })
    }

    /// A mapping whose public and internal names are the same.
    pub fn identity(entity: &str, names: &[&'static str]) -> Result<Self> {
        Self::new(entity, names, names)
    }

    /// Internal column for an exact public name.
    pub fn internal(&self, public: &str) -> Option<Column> {
        self.public
            .iter()
            .position(|name| *name == public)
            .map(|idx| self.internal[idx])
    }

    pub fn public_names(&self) -> &[&'static str] {
        &self.public
    }

    pub fn len(&self) -> usize {
        self.public.len()
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty()
    }
}
