use crate::{
    auth::AuthenticatedUser, error::ApiResult, routes::search::SearchParams, state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use pkgx_registry::{Package, SearchPage, User};
use pkgx_search::SearchQuery;

const OWNER_QUALIFIER: &str = "owner";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{username}", get(get_user))
        .route("/users/{username}/packages", get(list_user_packages))
}

/// Routes for the authenticated principal
pub fn current_user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_current_user))
        .route("/user/packages", get(list_current_user_packages))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(SearchParams),
    responses((status = 200, body = SearchPage<User>))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<User>>> {
    let page = state
        .users
        .search(&SearchQuery::default(), &params.pagination(), &params.sorting())
        .await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, body = User),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<User>> {
    let user = state.users.get(&username).await?;

    Ok(Json(user))
}

/// Package search restricted to one owner. The path wins over any `owner:`
/// qualifier in `q`.
#[utoipa::path(
    get,
    path = "/users/{username}/packages",
    tag = "users",
    params(("username" = String, Path, description = "Username"), SearchParams),
    responses(
        (status = 200, body = SearchPage<Package>),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn list_user_packages(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<Package>>> {
    let user = state.users.get(&username).await?;

    owned_packages(&state, &user.username, &params).await
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "users",
    security(("basic" = []), ("api_key" = [])),
    responses(
        (status = 200, body = User),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn get_current_user(Extension(user): Extension<AuthenticatedUser>) -> Json<User> {
    Json(user.0)
}

#[utoipa::path(
    get,
    path = "/user/packages",
    tag = "users",
    params(SearchParams),
    security(("basic" = []), ("api_key" = [])),
    responses(
        (status = 200, body = SearchPage<Package>),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn list_current_user_packages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<Package>>> {
    owned_packages(&state, &user.0.username, &params).await
}

async fn owned_packages(
    state: &AppState,
    username: &str,
    params: &SearchParams,
) -> ApiResult<Json<SearchPage<Package>>> {
    let query = params.query().with_qualifier(OWNER_QUALIFIER, username);
    let page = state
        .packages
        .search(&query, &params.pagination(), &params.sorting())
        .await?;

    Ok(Json(page))
}
