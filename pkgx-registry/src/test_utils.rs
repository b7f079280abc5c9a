//! Fixtures for tests in this crate and in pkgx-api.

use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Minimal user row for fixtures. Hashes are stored as given.
pub struct UserFixture<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub is_public_email: bool,
    pub password_hash: &'a str,
    pub api_key_hash: Option<&'a str>,
    pub location: Option<&'a str>,
    pub joined_at: &'a str,
}

impl<'a> UserFixture<'a> {
    pub fn new(username: &'a str) -> Self {
        Self {
            username,
            name: username,
            email: "user@example.com",
            is_public_email: false,
            password_hash: "",
            api_key_hash: None,
            location: None,
            joined_at: "2017-01-01 00:00:00",
        }
    }
}

/// Insert a user and return its id.
pub async fn insert_user(pool: &SqlitePool, user: &UserFixture<'_>) -> i64 {
    sqlx::query(
        "INSERT INTO users (username, name, email, is_public_email, password_hash, api_key_hash, location, joined_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.username)
    .bind(user.name)
    .bind(user.email)
    .bind(user.is_public_email)
    .bind(user.password_hash)
    .bind(user.api_key_hash)
    .bind(user.location)
    .bind(user.joined_at)
    .execute(pool)
    .await
    .expect("Failed to insert fixture user")
    .last_insert_rowid()
}

/// Minimal package row for fixtures.
pub struct PackageFixture<'a> {
    pub name: &'a str,
    pub owner_id: i64,
    pub description: &'a str,
    pub tags: &'a [&'a str],
    pub versions: &'a [&'a str],
    pub downloads: usize,
    pub published_at: &'a str,
    pub last_released_at: &'a str,
}

impl<'a> PackageFixture<'a> {
    pub fn new(name: &'a str, owner_id: i64) -> Self {
        Self {
            name,
            owner_id,
            description: "",
            tags: &[],
            versions: &["1.0.0"],
            downloads: 0,
            published_at: "2018-01-01 00:00:00",
            last_released_at: "2018-01-01 00:00:00",
        }
    }
}

/// Insert a package with its tags, versions and download records and return its id.
pub async fn insert_package(pool: &SqlitePool, package: &PackageFixture<'_>) -> i64 {
    let latest = package.versions.last().copied().unwrap_or("1.0.0");

    let id = sqlx::query(
        "INSERT INTO packages (name, owner_id, latest_version, description, license, published_at, last_released_at)
         VALUES (?, ?, ?, ?, 'MIT', ?, ?)",
    )
    .bind(package.name)
    .bind(package.owner_id)
    .bind(latest)
    .bind(package.description)
    .bind(package.published_at)
    .bind(package.last_released_at)
    .execute(pool)
    .await
    .expect("Failed to insert fixture package")
    .last_insert_rowid();

    for tag in package.tags {
        sqlx::query("INSERT INTO package_tags (package_id, tag) VALUES (?, ?)")
            .bind(id)
            .bind(*tag)
            .execute(pool)
            .await
            .expect("Failed to insert fixture tag");
    }

    for (idx, version) in package.versions.iter().enumerate() {
        sqlx::query(
            "INSERT INTO package_versions (package_id, version, released_at) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(*version)
        .bind(format!("2018-01-{:02} 00:00:00", idx + 1))
        .execute(pool)
        .await
        .expect("Failed to insert fixture version");
    }

    for _ in 0..package.downloads {
        sqlx::query("INSERT INTO package_downloads (package_id) VALUES (?)")
            .bind(id)
            .execute(pool)
            .await
            .expect("Failed to insert fixture download");
    }

    id
}

/// Store a README for a package version.
pub async fn insert_readme(pool: &SqlitePool, package_id: i64, version: &str, content: &[u8]) {
    sqlx::query(
        "INSERT INTO package_readme (package_id, version, name, file_size, content) VALUES (?, ?, 'README.md', ?, ?)",
    )
    .bind(package_id)
    .bind(version)
    .bind(content.len() as i64)
    .bind(content)
    .execute(pool)
    .await
    .expect("Failed to insert fixture readme");
}
