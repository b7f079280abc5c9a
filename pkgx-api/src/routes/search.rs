use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use pkgx_registry::{Package, SearchPage, User};
use pkgx_search::{tokenize, PaginationConfig, SearchQuery, SortingConfig};
use serde::Deserialize;
use utoipa::IntoParams;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search/packages", get(search_packages))
        .route("/search/users", get(search_users))
}

/// Raw search parameters. Everything stays a string so that bad paging or
/// ordering input falls back to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Search string, e.g. `websocket in:name,desc downloads:>=1000`
    pub q: Option<String>,
    /// Comma-separated sort keys
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub order: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> SearchQuery {
        tokenize(self.q.as_deref().unwrap_or_default())
    }

    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig::from_raw(self.page.as_deref(), self.per_page.as_deref())
    }

    pub fn sorting(&self) -> SortingConfig {
        SortingConfig::new(
            self.sort.clone().unwrap_or_default(),
            self.order.clone().unwrap_or_default(),
        )
    }
}

#[utoipa::path(
    get,
    path = "/search/packages",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, body = SearchPage<Package>),
        (status = 400, description = "Malformed qualifier value")
    )
)]
pub async fn search_packages(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<Package>>> {
    let page = state
        .packages
        .search(&params.query(), &params.pagination(), &params.sorting())
        .await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/search/users",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, body = SearchPage<User>),
        (status = 400, description = "Malformed qualifier value")
    )
)]
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<User>>> {
    let page = state
        .users
        .search(&params.query(), &params.pagination(), &params.sorting())
        .await?;

    Ok(Json(page))
}
