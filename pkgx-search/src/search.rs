//! # Search Orchestrator
//!
//! A [`SearchSchema`] describes one searchable entity: which qualifiers it
//! understands and how each one filters, which fields the free-text term can
//! be matched against, which columns it can be sorted by and how large a page
//! may be. [`SearchSchema::compile`] turns a tokenized query plus sort and
//! pagination input into a [`CompiledSearch`].

use crate::clause::{in_qualifier_clause, multi_word_clauses, relational_clause, Clause, Column};
use crate::error::{Result, SearchError};
use crate::mapping::ColumnMapping;
use crate::sort::{
    clamp_pagination, sanitize_order, sanitize_sort, split_sort_keys, PaginationConfig,
    SortingConfig,
};
use crate::tokenizer::{decode_value, tokenize, SearchQuery};
use indexmap::IndexMap;
use tracing::debug;

/// Qualifier that selects the fields the free-text term is matched against.
pub const IN_QUALIFIER: &str = "in";

/// How a qualifier's value turns into a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierKind {
    /// Comparison or range, e.g. `downloads:>=1000`, `created:2017-01-01..*`.
    Relational(Column),
    /// Any of the value's words, e.g. `location:San+Francisco`.
    MultiWord(Column),
    /// Exact equality, e.g. `owner:alice`.
    Exact(Column),
}

/// Output handed to the data-access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSearch {
    pub filter: Clause,
    pub order_by: String,
    pub limit: u64,
    pub offset: u64,
}

impl CompiledSearch {
    /// Single-row lookup with a fixed filter, e.g. fetching by name.
    pub fn lookup(filter: Clause, order_by: impl Into<String>) -> Self {
        Self {
            filter,
            order_by: order_by.into(),
            limit: 1,
            offset: 0,
        }
    }

    /// Append `WHERE`, `ORDER BY`, `LIMIT` and `OFFSET` to a base `SELECT`.
    pub fn render(&self, base_select: &str) -> String {
        let mut sql = base_select.trim_end().to_string();

        if !self.filter.is_empty() {
            sql.push_str(&format!(" WHERE {}", self.filter.fragment()));
        }
        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by));
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));

        sql
    }

    pub fn params(&self) -> &[String] {
        self.filter.params()
    }

    /// One-based page number of the window.
    pub fn page(&self) -> u64 {
        match self.limit {
            0 => 1,
            limit => self.offset / limit + 1,
        }
    }
}

/// Immutable per-entity search configuration.
#[derive(Debug, Clone)]
pub struct SearchSchema {
    entity: &'static str,
    qualifiers: IndexMap<&'static str, QualifierKind>,
    in_fields: ColumnMapping,
    sort_columns: ColumnMapping,
    default_sort: &'static str,
    max_page_size: u64,
}

impl SearchSchema {
    pub fn new(
        entity: &'static str,
        in_fields: ColumnMapping,
        sort_columns: ColumnMapping,
        default_sort: &'static str,
        max_page_size: u64,
    ) -> Result<Self> {
        if sort_columns.internal(default_sort).is_none() {
            return Err(SearchError::InvalidMapping {
                entity: entity.to_string(),
                reason: format!("default sort key '{}' is not sortable", default_sort),
            });
        }
        if max_page_size == 0 {
            return Err(SearchError::InvalidMapping {
                entity: entity.to_string(),
                reason: "max page size must be positive".to_string(),
            });
        }

        Ok(Self {
            entity,
            qualifiers: IndexMap::new(),
            in_fields,
            sort_columns,
            default_sort,
            max_page_size,
        })
    }

    /// Register a qualifier. Names are matched case-insensitively, so they
    /// are stored lowercase.
    pub fn with_qualifier(mut self, name: &'static str, kind: QualifierKind) -> Self {
        debug_assert_eq!(name, name.to_lowercase(), "qualifier names are lowercase");
        self.qualifiers.insert(name, kind);
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    pub fn qualifier_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.qualifiers.keys().copied()
    }

    /// Tokenize `raw` and compile it.
    pub fn compile_str(
        &self,
        raw: &str,
        pagination: &PaginationConfig,
        sorting: &SortingConfig,
    ) -> Result<CompiledSearch> {
        self.compile(&tokenize(raw), pagination, sorting)
    }

    pub fn compile(
        &self,
        query: &SearchQuery,
        pagination: &PaginationConfig,
        sorting: &SortingConfig,
    ) -> Result<CompiledSearch> {
        let mut clauses = Vec::new();

        let term = decode_value(&query.term);
        let term = term.trim();
        if !term.is_empty() {
            let in_value = query
                .qualifier(IN_QUALIFIER)
                .map(decode_value)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| self.in_fields.public_names().join(","));

            clauses.push(in_qualifier_clause(&self.in_fields, term, &in_value));
        }

        for (name, raw_value) in &query.qualifiers {
            if name == IN_QUALIFIER {
                continue;
            }

            let Some(kind) = self.qualifiers.get(name.as_str()) else {
                debug!(entity = self.entity, qualifier = %name, "Ignoring unknown qualifier");
                continue;
            };

            clauses.push(self.qualifier_clause(*kind, &decode_value(raw_value))?);
        }

        let filter = Clause::and(clauses);
        let order_by = self.order_by(sorting);
        let window = clamp_pagination(pagination.page, pagination.per_page, self.max_page_size);

        debug!(
            entity = self.entity,
            filter = filter.fragment(),
            params = filter.params().len(),
            order_by = %order_by,
            limit = window.limit,
            offset = window.offset,
            "Compiled search"
        );

        Ok(CompiledSearch {
            filter,
            order_by,
            limit: window.limit,
            offset: window.offset,
        })
    }

    fn qualifier_clause(&self, kind: QualifierKind, value: &str) -> Result<Clause> {
        match kind {
            QualifierKind::Relational(column) => relational_clause(column, value),
            QualifierKind::MultiWord(column) => {
                Ok(Clause::or(multi_word_clauses(column, value)).group())
            }
            QualifierKind::Exact(column) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(SearchError::MalformedValue {
                        column: column.to_string(),
                        value: value.to_string(),
                    });
                }
                Ok(Clause::equals(column, value))
            }
        }
    }

    /// `ORDER BY` body: every sanitized key mapped to its column, each with
    /// the requested direction.
    fn order_by(&self, sorting: &SortingConfig) -> String {
        let requested = split_sort_keys(&sorting.sort_by);
        let mut keys = sanitize_sort(&requested, self.sort_columns.public_names());
        if keys.is_empty() {
            keys.push(self.default_sort.to_string());
        }

        let order = sanitize_order(&sorting.order);

        keys.iter()
            .filter_map(|key| self.sort_columns.internal(key))
            .map(|column| format!("{} {}", column, order.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_schema() -> SearchSchema {
        SearchSchema::new(
            "widgets",
            ColumnMapping::identity("widgets", &["label"]).unwrap(),
            ColumnMapping::new("widgets", &["size", "id"], &["widget_size", "id"]).unwrap(),
            "id",
            20,
        )
        .unwrap()
        .with_qualifier("size", QualifierKind::Relational(Column::new("widget_size")))
        .with_qualifier("color", QualifierKind::Exact(Column::new("color")))
        .with_qualifier("origin", QualifierKind::MultiWord(Column::new("origin")))
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let compiled = tiny_schema()
            .compile_str("", &PaginationConfig::default(), &SortingConfig::default())
            .unwrap();

        assert!(compiled.filter.is_empty());
        assert!(compiled.params().is_empty());
        assert_eq!(compiled.order_by, "id ASC");
        assert_eq!(compiled.limit, 20);
        assert_eq!(compiled.offset, 0);
    }

    #[test]
    fn test_term_defaults_to_all_in_fields() {
        let compiled = tiny_schema()
            .compile_str("gear", &PaginationConfig::default(), &SortingConfig::default())
            .unwrap();

        assert_eq!(compiled.filter.fragment(), "(label LIKE ?)");
        assert_eq!(compiled.params(), ["%gear%"]);
    }

    #[test]
    fn test_in_without_term_is_ignored() {
        let compiled = tiny_schema()
            .compile_str("in:label", &PaginationConfig::default(), &SortingConfig::default())
            .unwrap();

        assert!(compiled.filter.is_empty());
    }

    #[test]
    fn test_qualifiers_follow_query_order() {
        let compiled = tiny_schema()
            .compile_str(
                "color:red size:<5 origin:New+York",
                &PaginationConfig::default(),
                &SortingConfig::default(),
            )
            .unwrap();

        assert_eq!(
            compiled.filter.fragment(),
            "(color = ?) AND (widget_size < ?) AND (origin LIKE ? OR origin LIKE ?)"
        );
        assert_eq!(compiled.params(), ["red", "5", "%New%", "%York%"]);
    }

    #[test]
    fn test_unknown_qualifiers_are_ignored() {
        let compiled = tiny_schema()
            .compile_str("weight:>3", &PaginationConfig::default(), &SortingConfig::default())
            .unwrap();

        assert!(compiled.filter.is_empty());
    }

    #[test]
    fn test_qualifier_names_are_case_insensitive() {
        let compiled = tiny_schema()
            .compile_str("SIZE:3", &PaginationConfig::default(), &SortingConfig::default())
            .unwrap();

        assert_eq!(compiled.filter.fragment(), "(widget_size = ?)");
    }

    #[test]
    fn test_last_in_qualifier_wins_across_case() {
        let schema = SearchSchema::new(
            "widgets",
            ColumnMapping::new("widgets", &["label", "notes"], &["label", "notes"]).unwrap(),
            ColumnMapping::identity("widgets", &["id"]).unwrap(),
            "id",
            20,
        )
        .unwrap();

        let compiled = schema
            .compile_str(
                "gear in:label IN:notes",
                &PaginationConfig::default(),
                &SortingConfig::default(),
            )
            .unwrap();

        assert_eq!(compiled.filter.fragment(), "(notes LIKE ?)");
    }

    #[test]
    fn test_render_huge_page_stays_in_sqlite_range() {
        let compiled = tiny_schema()
            .compile_str("", &PaginationConfig::new(u64::MAX, 20), &SortingConfig::default())
            .unwrap();

        assert_eq!(
            compiled.render("SELECT 1"),
            format!("SELECT 1 ORDER BY id ASC LIMIT 20 OFFSET {}", i64::MAX)
        );
    }

    #[test]
    fn test_blank_exact_value_is_rejected() {
        let result = tiny_schema().compile_str(
            "color:+",
            &PaginationConfig::default(),
            &SortingConfig::default(),
        );

        assert!(matches!(result, Err(SearchError::MalformedValue { .. })));
    }

    #[test]
    fn test_sorting_maps_public_keys() {
        let compiled = tiny_schema()
            .compile_str(
                "",
                &PaginationConfig::new(2, 5),
                &SortingConfig::new("Size,bogus,id", "desc"),
            )
            .unwrap();

        assert_eq!(compiled.order_by, "widget_size DESC, id DESC");
        assert_eq!(compiled.limit, 5);
        assert_eq!(compiled.offset, 5);
    }

    #[test]
    fn test_render_appends_clauses() {
        let compiled = tiny_schema()
            .compile_str("size:>1", &PaginationConfig::new(3, 10), &SortingConfig::default())
            .unwrap();

        assert_eq!(
            compiled.render("SELECT * FROM widgets\n"),
            "SELECT * FROM widgets WHERE (widget_size > ?) ORDER BY id ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_render_without_filter() {
        let compiled = CompiledSearch::lookup(Clause::empty(), "");

        assert_eq!(compiled.render("SELECT 1"), "SELECT 1 LIMIT 1 OFFSET 0");
    }

    #[test]
    fn test_default_sort_must_be_sortable() {
        let result = SearchSchema::new(
            "widgets",
            ColumnMapping::identity("widgets", &["label"]).unwrap(),
            ColumnMapping::identity("widgets", &["id"]).unwrap(),
            "label",
            20,
        );

        assert!(result.is_err());
    }
}
