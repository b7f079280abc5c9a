use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pkgx_registry::RegistryError;
use pkgx_search::SearchError;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    AuthError,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::AuthError => "auth_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::InternalError => "internal_error",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::AuthError => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::BadRequest(_) => ErrorCode::ValidationError,
            ApiError::Unauthorized(_) => ErrorCode::AuthError,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        if code == ErrorCode::InternalError {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, code = code.as_str(), "Request rejected");
        }

        (
            code.http_status(),
            Json(json!({ "error": self.to_string(), "code": code.as_str() })),
        )
            .into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            RegistryError::InvalidInput(msg) => ApiError::BadRequest(msg),
            RegistryError::Search(err) => err.into(),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MalformedValue { .. } => ApiError::BadRequest(err.to_string()),
            SearchError::InvalidMapping { .. } => ApiError::Internal(err.to_string()),
        }
    }
}
