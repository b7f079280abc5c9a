use pkgx_search::CompiledSearch;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of search results with the effective paging window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
}

impl<T> SearchPage<T> {
    pub fn new(items: Vec<T>, compiled: &CompiledSearch) -> Self {
        Self {
            items,
            page: compiled.page(),
            per_page: compiled.limit,
        }
    }
}
