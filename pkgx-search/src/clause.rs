//! # Clause Compiler
//!
//! Builds parameterized SQL filter fragments. Values supplied by callers only
//! ever travel as bound parameters; the one thing interpolated into fragment
//! text is a [`Column`], which can only be created from a `&'static str` and
//! is therefore part of the compiled-in allowlist.

use crate::error::{Result, SearchError};
use crate::mapping::ColumnMapping;
use crate::relational::{parse_relational, Bound, Operator, RelationalValue};
use std::fmt;
use tracing::debug;

const PLACEHOLDER: char = '?';

/// An internal storage column identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column(&'static str);

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A filter fragment plus the parameters bound to its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    fragment: String,
    params: Vec<String>,
}

impl Clause {
    fn new(fragment: String, params: Vec<String>) -> Self {
        debug_assert_eq!(
            fragment.matches(PLACEHOLDER).count(),
            params.len(),
            "placeholder count must match bound parameters in {fragment:?}"
        );
        Self { fragment, params }
    }

    /// A clause that filters nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `(column = ?)`
    pub fn equals(column: Column, value: impl Into<String>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    /// `(column <op> ?)`
    pub fn compare(column: Column, operator: Operator, value: impl Into<String>) -> Self {
        Self::new(
            format!("({} {} {})", column, operator, PLACEHOLDER),
            vec![value.into()],
        )
    }

    /// `column LIKE ?` bound to `%word%`.
    pub fn contains(column: Column, word: &str) -> Self {
        Self::new(
            format!("{} LIKE {}", column, PLACEHOLDER),
            vec![format!("%{}%", word)],
        )
    }

    /// Join the non-empty clauses with `AND`.
    pub fn and(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::join(clauses, " AND ")
    }

    /// Join the non-empty clauses with `OR`.
    pub fn or(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::join(clauses, " OR ")
    }

    fn join(clauses: impl IntoIterator<Item = Clause>, separator: &str) -> Self {
        let mut fragments = Vec::new();
        let mut params = Vec::new();

        for clause in clauses.into_iter().filter(|c| !c.is_empty()) {
            fragments.push(clause.fragment);
            params.extend(clause.params);
        }

        Self::new(fragments.join(separator), params)
    }

    /// Wrap the fragment in parentheses. Empty clauses stay empty.
    pub fn group(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            fragment: format!("({})", self.fragment),
            params: self.params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.fragment, self.params)
    }
}

/// One `LIKE` clause per whitespace-separated word of `value`.
///
/// The caller decides how to combine them: `OR` when matching several words
/// against a single column, `AND` when they act as independent filters.
pub fn multi_word_clauses(column: Column, value: &str) -> Vec<Clause> {
    value
        .split_whitespace()
        .map(|word| Clause::contains(column, word))
        .collect()
}

/// Compile a relational qualifier value against `column`.
///
/// Returns an empty clause for the fully open range `*..*`.
pub fn relational_clause(column: Column, value: &str) -> Result<Clause> {
    let malformed = || SearchError::MalformedValue {
        column: column.to_string(),
        value: value.to_string(),
    };

    match parse_relational(value) {
        RelationalValue::Comparison { operator, value: operand } => {
            if operand.trim().is_empty() {
                return Err(malformed());
            }
            Ok(Clause::compare(column, operator, operand))
        }
        RelationalValue::Range { lower, upper } => match (lower, upper) {
            (Bound::Unbounded, Bound::Unbounded) => Ok(Clause::empty()),
            (Bound::Unbounded, Bound::Value(upper)) => {
                Ok(Clause::compare(column, Operator::Lte, upper))
            }
            (Bound::Value(lower), Bound::Unbounded) => {
                Ok(Clause::compare(column, Operator::Gte, lower))
            }
            (Bound::Value(lower), Bound::Value(upper)) => Ok(Clause::new(
                format!(
                    "({col} {} {p} AND {col} {} {p})",
                    Operator::Gte,
                    Operator::Lte,
                    col = column,
                    p = PLACEHOLDER
                ),
                vec![lower, upper],
            )),
        },
    }
}

/// Match `term` against the fields named in `in_value`.
///
/// `in_value` is a comma-separated list of public field names. Names not in
/// `fields` are skipped. Every word of the term is matched against every
/// valid field's internal column and the results are OR-ed into one group.
pub fn in_qualifier_clause(fields: &ColumnMapping, term: &str, in_value: &str) -> Clause {
    let mut clauses = Vec::new();

    for field in in_value.split(',') {
        let field = field.trim().to_lowercase();
        if field.is_empty() {
            continue;
        }

        match fields.internal(&field) {
            Some(column) => clauses.extend(multi_word_clauses(column, term)),
            None => debug!(field = %field, "Ignoring unknown 'in' field"),
        }
    }

    Clause::or(clauses).group()
}
