use crate::db::{bind_params, serialize_datetime};
use crate::error::{RegistryError, Result};
use crate::page::SearchPage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};
use pkgx_search::{
    Clause, Column, CompiledSearch, PaginationConfig, SearchQuery, SearchSchema, SortingConfig,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use utoipa::ToSchema;

/// One row per package. Tags are folded into a comma-separated `tag` column so
/// `tag LIKE ?` matches any of them without duplicating packages.
const PACKAGE_SELECT: &str = r#"
    SELECT * FROM (
        SELECT
            p.id, p.name, u.username AS owner_username, p.latest_version,
            p.published_at, p.last_released_at, p.description, p.license,
            p.homepage_url, p.repository_url, p.documentation_url, p.bugs_url,
            p.engines_go, p.os,
            (SELECT GROUP_CONCAT(t.tag, ',') FROM package_tags t WHERE t.package_id = p.id) AS tag,
            CAST((SELECT COUNT(*) FROM package_downloads d WHERE d.package_id = p.id) AS INTEGER) AS downloads
        FROM packages p
        INNER JOIN users u ON u.id = p.owner_id
    ) AS packages
"#;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub downloads: i64,
    pub latest_version: String,

    #[serde(serialize_with = "serialize_datetime")]
    pub published_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub last_released_at: DateTime<Utc>,

    pub description: Option<String>,
    pub license: Option<String>,
    pub homepage_url: Option<String>,
    pub repository_url: Option<String>,
    pub documentation_url: Option<String>,
    pub bugs_url: Option<String>,
    pub engines_go: Option<String>,
    pub os: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageVersion {
    pub version: String,

    #[serde(serialize_with = "serialize_datetime")]
    pub released_at: DateTime<Utc>,
}

/// Release history of a single package, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VersionHistory {
    pub id: i64,
    pub name: String,
    pub versions: Vec<PackageVersion>,
}

/// README of one package version with base64-encoded content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Readme {
    pub name: String,
    pub version: String,
    pub size: i64,
    pub content: String,
}

#[derive(Clone)]
pub struct PackageStore {
    pool: SqlitePool,
    schema: Arc<SearchSchema>,
}

impl PackageStore {
    pub fn new(pool: SqlitePool, schema: Arc<SearchSchema>) -> Self {
        Self { pool, schema }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// Compile a search and run it
    pub async fn search(
        &self,
        query: &SearchQuery,
        pagination: &PaginationConfig,
        sorting: &SortingConfig,
    ) -> Result<SearchPage<Package>> {
        let compiled = self.schema.compile(query, pagination, sorting)?;
        let items = self.query(&compiled).await?;

        Ok(SearchPage::new(items, &compiled))
    }

    /// Run an already compiled search against the package listing
    pub async fn query(&self, compiled: &CompiledSearch) -> Result<Vec<Package>> {
        let sql = compiled.render(PACKAGE_SELECT);
        tracing::debug!(sql = %sql, params = ?compiled.params(), "Querying packages");

        let rows = bind_params(sqlx::query_as::<_, PackageRow>(&sql), compiled.params())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    /// Get a single package by name
    pub async fn get(&self, name: &str) -> Result<Package> {
        let lookup = CompiledSearch::lookup(Clause::equals(Column::new("name"), name), "id ASC");

        self.query(&lookup)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::NotFound(format!("Package {}", name)))
    }

    /// Version history ordered by release time
    pub async fn versions(&self, name: &str) -> Result<VersionHistory> {
        let rows = sqlx::query_as::<_, VersionRow>(
            r#"
            SELECT p.id AS package_id, p.name AS package_name, v.version, v.released_at
            FROM packages p
            INNER JOIN package_versions v ON v.package_id = p.id
            WHERE p.name = ?
            ORDER BY v.released_at ASC, v.id ASC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        let (id, package_name) = match rows.first() {
            Some(first) => (first.package_id, first.package_name.clone()),
            None => return Err(RegistryError::NotFound(format!("Package {}", name))),
        };

        Ok(VersionHistory {
            id,
            name: package_name,
            versions: rows
                .into_iter()
                .map(|row| PackageVersion {
                    version: row.version,
                    released_at: row.released_at.and_utc(),
                })
                .collect(),
        })
    }

    pub async fn version_exists(&self, name: &str, version: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM packages p
            INNER JOIN package_versions v ON v.package_id = p.id
            WHERE p.name = ? AND v.version = ?
            "#,
        )
        .bind(name)
        .bind(version)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// README of `version`, or of the latest release when no version is given
    pub async fn readme(&self, name: &str, version: Option<&str>) -> Result<Readme> {
        let package = self.get(name).await?;
        let version = version.unwrap_or(&package.latest_version);

        let row = sqlx::query_as::<_, ReadmeRow>(
            r#"
            SELECT name, file_size, content
            FROM package_readme
            WHERE package_id = ? AND version = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(package.id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RegistryError::NotFound(format!("README of {}@{}", name, version)))?;

        Ok(Readme {
            name: row.name,
            version: version.to_string(),
            size: row.file_size,
            content: STANDARD.encode(row.content),
        })
    }

    /// Downloads recorded across the whole registry
    pub async fn total_downloads(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM package_downloads")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

/// Split a stored `os` list such as `linux:amd64, darwin , windows:` into
/// `os[:arch]` entries.
pub fn parse_os_list(os: &str) -> Vec<String> {
    os.split(',')
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, ':').map(str::trim);
            let os_name = parts.next().filter(|name| !name.is_empty())?;
            Some(match parts.next() {
                Some(arch) if !arch.is_empty() => format!("{}:{}", os_name, arch),
                _ => os_name.to_string(),
            })
        })
        .collect()
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: i64,
    name: String,
    owner_username: String,
    downloads: i64,
    latest_version: String,
    published_at: NaiveDateTime,
    last_released_at: NaiveDateTime,
    description: Option<String>,
    license: Option<String>,
    homepage_url: Option<String>,
    repository_url: Option<String>,
    documentation_url: Option<String>,
    bugs_url: Option<String>,
    engines_go: Option<String>,
    os: Option<String>,
    tag: Option<String>,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Package {
            id: row.id,
            name: row.name,
            owner: row.owner_username,
            downloads: row.downloads,
            latest_version: row.latest_version,
            published_at: row.published_at.and_utc(),
            last_released_at: row.last_released_at.and_utc(),
            description: row.description,
            license: row.license,
            homepage_url: row.homepage_url,
            repository_url: row.repository_url,
            documentation_url: row.documentation_url,
            bugs_url: row.bugs_url,
            engines_go: row.engines_go,
            os: row.os.as_deref().map(parse_os_list).unwrap_or_default(),
            tags: row
                .tag
                .map(|tags| tags.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    package_id: i64,
    package_name: String,
    version: String,
    released_at: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct ReadmeRow {
    name: String,
    file_size: i64,
    content: Vec<u8>,
}
