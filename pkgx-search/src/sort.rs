//! # Sort and Pagination Sanitizer
//!
//! Sort keys and directions come straight from query parameters. Only keys
//! found in an entity's public allowlist survive, and page sizes are clamped
//! to the entity's ceiling.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sort direction. Anything other than `asc`/`desc` resolves to [`SortOrder::Asc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Largest offset SQLite accepts; its integers are signed 64-bit.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Limit/offset pair ready for a `LIMIT ? OFFSET ?` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

/// Requested page and page size. Zero means "not given".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationConfig {
    pub page: u64,
    pub per_page: u64,
}

impl PaginationConfig {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Parse raw query-string values. Missing or non-numeric input is treated
    /// as not given.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: parse_count(page),
            per_page: parse_count(per_page),
        }
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// Requested sort keys (comma separated) and direction, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortingConfig {
    pub sort_by: String,
    pub order: String,
}

impl SortingConfig {
    pub fn new(sort_by: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            sort_by: sort_by.into(),
            order: order.into(),
        }
    }
}

/// Split a raw `sort` parameter into its comma-separated keys.
pub fn split_sort_keys(raw: &str) -> Vec<&str> {
    raw.split(',').collect()
}

/// Keep the requested keys that appear in `allowed`, lowercased and trimmed,
/// in the order they were requested.
pub fn sanitize_sort<S: AsRef<str>>(requested: &[S], allowed: &[&str]) -> Vec<String> {
    requested
        .iter()
        .map(|key| key.as_ref().trim().to_lowercase())
        .filter(|key| {
            if key.is_empty() {
                return false;
            }
            let known = allowed.contains(&key.as_str());
            if !known {
                debug!(key = %key, "Ignoring unknown sort key");
            }
            known
        })
        .collect()
}

/// Case-insensitive direction parsing with an `ASC` fallback.
pub fn sanitize_order(requested: &str) -> SortOrder {
    match requested.trim().to_uppercase().as_str() {
        "ASC" => SortOrder::Asc,
        "DESC" => SortOrder::Desc,
        "" => SortOrder::default(),
        other => {
            debug!(order = %other, "Ignoring unknown sort order");
            SortOrder::default()
        }
    }
}

/// Clamp the requested page and page size and compute limit/offset.
///
/// Pages start at 1. A page size outside `(0, max_per_page]` becomes
/// `max_per_page`. Pages past the end are allowed and simply return nothing;
/// the offset is capped at [`MAX_OFFSET`].
pub fn clamp_pagination(page: u64, per_page: u64, max_per_page: u64) -> PageWindow {
    let page = page.max(1);
    let limit = if per_page == 0 || per_page > max_per_page {
        max_per_page
    } else {
        per_page
    };

    PageWindow {
        limit,
        offset: (page - 1).saturating_mul(limit).min(MAX_OFFSET),
    }
}
