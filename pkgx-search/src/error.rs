use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A qualifier value could not be turned into a filter.
    #[error("Invalid value for {column}: '{value}'")]
    MalformedValue { column: String, value: String },

    /// A column mapping violates its invariants. Raised while building a
    /// schema at startup, never per request.
    #[error("Invalid column mapping for {entity}: {reason}")]
    InvalidMapping { entity: String, reason: String },
}
