use crate::{
    error::{ApiError, ApiResult},
    routes::search::SearchParams,
    state::AppState,
    validation::{sanitize_version, validate_package_name},
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use pkgx_registry::{Package, Readme, SearchPage, VersionHistory};
use pkgx_search::SearchQuery;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/packages", get(list_packages))
        .route("/packages/{name}", get(get_package))
        .route("/packages/{name}/readme", get(get_readme))
        .route("/versions/{name}", get(get_versions))
        .route("/downloads", get(get_downloads))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersionParams {
    /// Specific release, e.g. `1.2.0`
    pub v: Option<String>,
}

impl VersionParams {
    fn sanitized(&self) -> ApiResult<Option<String>> {
        self.v
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(sanitize_version)
            .transpose()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadStats {
    pub total_downloads: i64,
}

/// All packages, sorted and paged like a search with no filter. `q` is ignored.
#[utoipa::path(
    get,
    path = "/packages",
    tag = "packages",
    params(SearchParams),
    responses((status = 200, body = SearchPage<Package>))
)]
pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage<Package>>> {
    let page = state
        .packages
        .search(&SearchQuery::default(), &params.pagination(), &params.sorting())
        .await?;

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/packages/{name}",
    tag = "packages",
    params(("name" = String, Path, description = "Package name"), VersionParams),
    responses(
        (status = 200, body = Package),
        (status = 400, description = "Invalid package name or version"),
        (status = 404, description = "Unknown package or version")
    )
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<VersionParams>,
) -> ApiResult<Json<Package>> {
    validate_package_name(&name)?;

    let package = state.packages.get(&name).await?;

    if let Some(version) = params.sanitized()? {
        if !state.packages.version_exists(&name, &version).await? {
            return Err(ApiError::NotFound(format!(
                "Version {} of package {} not found",
                version, name
            )));
        }
    }

    Ok(Json(package))
}

#[utoipa::path(
    get,
    path = "/packages/{name}/readme",
    tag = "packages",
    params(("name" = String, Path, description = "Package name"), VersionParams),
    responses(
        (status = 200, body = Readme),
        (status = 404, description = "Unknown package or no README for the version")
    )
)]
pub async fn get_readme(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<VersionParams>,
) -> ApiResult<Json<Readme>> {
    validate_package_name(&name)?;

    let version = params.sanitized()?;
    let readme = state.packages.readme(&name, version.as_deref()).await?;

    Ok(Json(readme))
}

#[utoipa::path(
    get,
    path = "/versions/{name}",
    tag = "packages",
    params(("name" = String, Path, description = "Package name")),
    responses(
        (status = 200, body = VersionHistory),
        (status = 404, description = "Unknown package")
    )
)]
pub async fn get_versions(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<VersionHistory>> {
    validate_package_name(&name)?;

    let history = state.packages.versions(&name).await?;

    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/downloads",
    tag = "packages",
    responses((status = 200, body = DownloadStats))
)]
pub async fn get_downloads(State(state): State<AppState>) -> ApiResult<Json<DownloadStats>> {
    let total_downloads = state.packages.total_downloads().await?;

    Ok(Json(DownloadStats { total_downloads }))
}
