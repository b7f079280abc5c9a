pub mod health;
pub mod packages;
pub mod search;
pub mod users;

use crate::{api_docs::ApiDoc, auth::auth_middleware, state::AppState};
use axum::{middleware, routing::get, Json, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub async fn create_app(pool: SqlitePool) -> anyhow::Result<Router> {
    let state = AppState::new(pool)?;

    Ok(create_app_with_state(state))
}

/// Build the router over an existing state, e.g. one with a custom resolver.
pub fn create_app_with_state(state: AppState) -> Router {
    // Read-only public API
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(health::routes())
        .route("/api-docs/openapi.json", get(openapi_spec))
        .merge(search::routes())
        .merge(packages::routes())
        .merge(users::routes())
        .merge(
            users::current_user_routes().layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
