//! # Relational Value Parser
//!
//! Classifies a qualifier value as a comparison or a range:
//!
//! - `packages:<=1000`, `packages:1000`
//! - `joined:2016-04-30..2016-07-04`
//! - `joined:2016-04-30..*`, `joined:*..2016-07-04`

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static COMPARISON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(>=|>|<=|<)(.+)$").expect("Comparison regex should compile - static pattern")
});

static RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^.]+)\.\.([^.]+)$").expect("Range regex should compile - static pattern")
});

const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">=" => Some(Operator::Gte),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Lte),
            "<" => Some(Operator::Lt),
            "=" => Some(Operator::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    Value(String),
}

impl Bound {
    fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            Bound::Unbounded
        } else {
            Bound::Value(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationalValue {
    Comparison { operator: Operator, value: String },
    Range { lower: Bound, upper: Bound },
}

impl RelationalValue {
    pub fn comparison(operator: Operator, value: impl Into<String>) -> Self {
        RelationalValue::Comparison {
            operator,
            value: value.into(),
        }
    }
}

/// Classify a qualifier value. Operators take precedence over ranges, and
/// anything else is an equality match on the whole (trimmed) value.
pub fn parse_relational(value: &str) -> RelationalValue {
    let value = value.trim();

    if let Some(caps) = COMPARISON_REGEX.captures(value) {
        if let Some(operator) = Operator::from_symbol(&caps[1]) {
            return RelationalValue::comparison(operator, &caps[2]);
        }
    }

    if let Some(caps) = RANGE_REGEX.captures(value) {
        return RelationalValue::Range {
            lower: Bound::parse(&caps[1]),
            upper: Bound::parse(&caps[2]),
        };
    }

    RelationalValue::comparison(Operator::Eq, value)
}
