use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pkgx_registry::{User, UserStore};
use sha2::{Digest, Sha256};

const SCHEME_BASIC: &str = "Basic";
const SCHEME_API_KEY: &str = "APIKey";

/// Credentials carried by an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    ApiKey(String),
    Unrecognized(String),
}

impl Credentials {
    /// Parse `<scheme> <value>`. Basic values are base64 `user:pass`; a
    /// missing colon means an empty password.
    pub fn parse(header: &str) -> ApiResult<Self> {
        let mut parts = header.split_whitespace();
        let (Some(scheme), Some(value)) = (parts.next(), parts.next()) else {
            return Err(ApiError::Unauthorized("Invalid auth data".to_string()));
        };

        match scheme {
            SCHEME_BASIC => {
                let decoded = STANDARD
                    .decode(value)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .ok_or_else(|| {
                        ApiError::Unauthorized("Invalid basic auth base64 value".to_string())
                    })?;

                let (username, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));

                Ok(Credentials::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            SCHEME_API_KEY => Ok(Credentials::ApiKey(value.to_string())),
            other => Ok(Credentials::Unrecognized(other.to_string())),
        }
    }

    pub fn scheme(&self) -> &str {
        match self {
            Credentials::Basic { .. } => SCHEME_BASIC,
            Credentials::ApiKey(_) => SCHEME_API_KEY,
            Credentials::Unrecognized(scheme) => scheme,
        }
    }
}

/// Hex SHA-256 digest under which passwords and API keys are stored.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolves credentials to the user they belong to.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `Ok(None)` when the credentials match nobody.
    async fn resolve(&self, credentials: &Credentials) -> ApiResult<Option<User>>;
}

/// Looks principals up in the registry by hashed secret.
pub struct StoreResolver {
    users: UserStore,
}

impl StoreResolver {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }
}

#[async_trait]
impl PrincipalResolver for StoreResolver {
    async fn resolve(&self, credentials: &Credentials) -> ApiResult<Option<User>> {
        let user = match credentials {
            Credentials::Basic { username, password } => {
                self.users
                    .find_by_login(username, &hash_secret(password))
                    .await?
            }
            Credentials::ApiKey(key) => self.users.find_by_api_key(&hash_secret(key)).await?,
            Credentials::Unrecognized(scheme) => {
                return Err(ApiError::Unauthorized(format!(
                    "Auth type {} is not supported",
                    scheme
                )));
            }
        };

        Ok(user)
    }
}

/// The user resolved from the request's credentials, with private fields.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

/// Auth middleware - resolves the `Authorization` header to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let credentials = Credentials::parse(header)?;
    let user = state
        .resolver
        .resolve(&credentials)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("Invalid {} credentials", credentials.scheme()))
        })?;

    tracing::debug!(username = %user.username, "Authenticated request");
    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        // "alice:s3cret:x"
        let creds = Credentials::parse("Basic YWxpY2U6czNjcmV0Ong=").unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "alice".to_string(),
                password: "s3cret:x".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_basic_without_colon_has_empty_password() {
        // "alice"
        let creds = Credentials::parse("  Basic   YWxpY2U=  ").unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "alice".to_string(),
                password: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_api_key_and_unknown_scheme() {
        assert_eq!(
            Credentials::parse("APIKey abc123").unwrap(),
            Credentials::ApiKey("abc123".to_string())
        );

        let bearer = Credentials::parse("Bearer token").unwrap();
        assert_eq!(bearer, Credentials::Unrecognized("Bearer".to_string()));
        assert_eq!(bearer.scheme(), "Bearer");
    }

    #[test]
    fn test_parse_rejects_malformed_headers() {
        for header in ["", "Basic", "APIKey", "Basic !!!notbase64"] {
            assert!(
                matches!(Credentials::parse(header), Err(ApiError::Unauthorized(_))),
                "{:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn test_hash_secret() {
        assert_eq!(
            hash_secret("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
