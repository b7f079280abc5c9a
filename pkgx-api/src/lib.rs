//! HTTP API for the package registry
//!
//! Read-only JSON endpoints over `pkgx-registry`: package and user search,
//! single-entity lookups, version history, README content and download
//! totals, plus the authenticated current-user view.

pub mod api_docs;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{AuthenticatedUser, Credentials, PrincipalResolver, StoreResolver};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::{create_app, create_app_with_state};
pub use state::AppState;
