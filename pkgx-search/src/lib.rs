//! Search-query compiler for the package registry
//!
//! Turns a compact, human-typed query such as
//! `websocket in:name,desc downloads:>=1000 created:2017-01-01..2017-12-31`
//! plus raw sort and pagination parameters into a parameterized filter, an
//! `ORDER BY` body and a limit/offset pair. Nothing in this crate performs
//! I/O; the output is handed to the data-access layer in `pkgx-registry`.

pub mod clause;
pub mod entities;
pub mod error;
pub mod mapping;
pub mod relational;
pub mod search;
pub mod sort;
pub mod tokenizer;

pub use clause::{Clause, Column};
pub use error::{Result, SearchError};
pub use mapping::ColumnMapping;
pub use relational::{parse_relational, Bound, Operator, RelationalValue};
pub use search::{CompiledSearch, QualifierKind, SearchSchema};
pub use sort::{PageWindow, PaginationConfig, SortOrder, SortingConfig};
pub use tokenizer::{decode_value, tokenize, SearchQuery};
