//! Common test utilities and helpers for pkgx-api tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pkgx_api::auth::hash_secret;
use pkgx_registry::test_utils::{
    insert_package, insert_readme, insert_user, PackageFixture, UserFixture,
};
use sqlx::SqlitePool;

pub const ALICE_PASSWORD: &str = "wonderland";
pub const ALICE_API_KEY: &str = "alice-api-key";

pub use pkgx_registry::test_utils::create_test_db;

/// Create a test app with the given database pool
pub async fn create_test_app(pool: SqlitePool) -> Router {
    pkgx_api::create_app(pool)
        .await
        .expect("Failed to create test app")
}

/// Fixture: two users and three packages
///
/// alice (public email, San Francisco) owns `hello-ws` (1500 downloads, two
/// releases, tagged websocket) and `jsonkit` (20 downloads, has a README);
/// bob (private email, Berlin) owns `greeter` (5 downloads).
pub async fn seed_registry(pool: &SqlitePool) {
    let password_hash = hash_secret(ALICE_PASSWORD);
    let api_key_hash = hash_secret(ALICE_API_KEY);

    let alice = insert_user(
        pool,
        &UserFixture {
            name: "Alice",
            email: "alice@example.com",
            is_public_email: true,
            password_hash: &password_hash,
            api_key_hash: Some(&api_key_hash),
            location: Some("San Francisco"),
            joined_at: "2016-05-01 10:00:00",
            ..UserFixture::new("alice")
        },
    )
    .await;
    let bob = insert_user(
        pool,
        &UserFixture {
            email: "bob@example.com",
            password_hash: "not-a-real-hash",
            location: Some("Berlin"),
            joined_at: "2018-02-01 10:00:00",
            ..UserFixture::new("bob")
        },
    )
    .await;

    insert_package(
        pool,
        &PackageFixture {
            description: "Fast websocket server",
            tags: &["net", "websocket"],
            versions: &["0.1.0", "1.0.0"],
            downloads: 1500,
            published_at: "2020-03-01 00:00:00",
            last_released_at: "2020-06-01 00:00:00",
            ..PackageFixture::new("hello-ws", alice)
        },
    )
    .await;
    let jsonkit = insert_package(
        pool,
        &PackageFixture {
            description: "JSON helpers",
            tags: &["json"],
            downloads: 20,
            published_at: "2019-01-01 00:00:00",
            last_released_at: "2019-01-01 00:00:00",
            ..PackageFixture::new("jsonkit", alice)
        },
    )
    .await;
    insert_package(
        pool,
        &PackageFixture {
            description: "Say hello",
            downloads: 5,
            published_at: "2021-01-01 00:00:00",
            last_released_at: "2021-01-01 00:00:00",
            ..PackageFixture::new("greeter", bob)
        },
    )
    .await;

    insert_readme(pool, jsonkit, "1.0.0", b"# jsonkit").await;
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: Response<Body>) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// `Authorization` value for Basic auth
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// `Authorization` value for API key auth
pub fn api_key_auth(key: &str) -> String {
    format!("APIKey {}", key)
}

/// TestClient to encapsulate API interaction logic
pub struct TestClient {
    pub app: Router,
}

impl TestClient {
    /// Create a new TestClient over a seeded in-memory DB
    pub async fn seeded() -> (Self, SqlitePool) {
        let pool = create_test_db().await;
        seed_registry(&pool).await;
        let app = create_test_app(pool.clone()).await;
        (Self { app }, pool)
    }

    /// Send a request to the API
    pub async fn send_request(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Get request to an endpoint
    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);

        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = builder.body(Body::empty()).unwrap();
        self.send_request(request).await
    }

    /// GET and decode the JSON body, asserting the status first
    pub async fn get_json(
        &self,
        uri: &str,
        authorization: Option<&str>,
        status: axum::http::StatusCode,
    ) -> serde_json::Value {
        let response = self.get(uri, authorization).await;
        assert_eq!(response.status(), status, "unexpected status for {}", uri);
        extract_json_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_registry() {
        let pool = create_test_db().await;
        seed_registry(&pool).await;

        let (packages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM packages")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(packages, 3);
    }
}
