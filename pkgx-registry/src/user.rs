use crate::db::{bind_params, serialize_datetime};
use crate::error::{RegistryError, Result};
use crate::page::SearchPage;
use chrono::{DateTime, NaiveDateTime, Utc};
use pkgx_search::{
    Clause, Column, CompiledSearch, PaginationConfig, SearchQuery, SearchSchema, SortingConfig,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use utoipa::ToSchema;

const USER_SELECT: &str = r#"
    SELECT * FROM (
        SELECT
            u.id, u.name, u.username, u.email, u.is_public_email, u.password_hash,
            u.api_key_hash, u.avatar, u.url, u.organization, u.location, u.github,
            u.twitter, u.stack_overflow, u.linkedin, u.joined_at,
            CAST((SELECT COUNT(*) FROM packages p WHERE p.owner_id = u.id) AS INTEGER) AS packages_count
        FROM users u
    ) AS users
"#;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip)]
    pub is_public_email: bool,

    pub avatar: String,
    pub url: Option<String>,
    pub organization: Option<String>,
    pub location: Option<String>,
    pub social: SocialAccounts,
    pub packages_count: i64,

    #[serde(serialize_with = "serialize_datetime")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SocialAccounts {
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub stack_overflow: Option<String>,
    pub linkedin: Option<String>,
}

impl User {
    /// The user as seen by anyone else: email only when marked public.
    pub fn public_view(mut self) -> Self {
        if !self.is_public_email {
            self.email = None;
        }
        self
    }
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
    schema: Arc<SearchSchema>,
}

impl UserStore {
    pub fn new(pool: SqlitePool, schema: Arc<SearchSchema>) -> Self {
        Self { pool, schema }
    }

    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// Compile a search and run it. Results are public views.
    pub async fn search(
        &self,
        query: &SearchQuery,
        pagination: &PaginationConfig,
        sorting: &SortingConfig,
    ) -> Result<SearchPage<User>> {
        let compiled = self.schema.compile(query, pagination, sorting)?;
        let items = self
            .query(&compiled)
            .await?
            .into_iter()
            .map(User::public_view)
            .collect();

        Ok(SearchPage::new(items, &compiled))
    }

    /// Run an already compiled search. Emails are returned unfiltered.
    pub async fn query(&self, compiled: &CompiledSearch) -> Result<Vec<User>> {
        let sql = compiled.render(USER_SELECT);
        tracing::debug!(sql = %sql, params = ?compiled.params(), "Querying users");

        let rows = bind_params(sqlx::query_as::<_, UserRow>(&sql), compiled.params())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    /// Get the public view of a user by username
    pub async fn get(&self, username: &str) -> Result<User> {
        let lookup = CompiledSearch::lookup(
            Clause::equals(Column::new("username"), username),
            "id ASC",
        );

        self.first(&lookup)
            .await?
            .map(User::public_view)
            .ok_or_else(|| RegistryError::NotFound(format!("User {}", username)))
    }

    /// Principal lookup by username and hashed password
    pub async fn find_by_login(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        let lookup = CompiledSearch::lookup(
            Clause::and([
                Clause::equals(Column::new("username"), username),
                Clause::equals(Column::new("password_hash"), password_hash),
            ]),
            "id ASC",
        );

        self.first(&lookup).await
    }

    /// Principal lookup by hashed API key
    pub async fn find_by_api_key(&self, api_key_hash: &str) -> Result<Option<User>> {
        let lookup = CompiledSearch::lookup(
            Clause::equals(Column::new("api_key_hash"), api_key_hash),
            "id ASC",
        );

        self.first(&lookup).await
    }

    async fn first(&self, lookup: &CompiledSearch) -> Result<Option<User>> {
        Ok(self.query(lookup).await?.into_iter().next())
    }
}

// Internal row type for SQLx. Credential hashes are selected for filtering only.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    is_public_email: bool,
    avatar: String,
    url: Option<String>,
    organization: Option<String>,
    location: Option<String>,
    github: Option<String>,
    twitter: Option<String>,
    stack_overflow: Option<String>,
    linkedin: Option<String>,
    joined_at: NaiveDateTime,
    packages_count: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            username: row.username,
            email: Some(row.email),
            is_public_email: row.is_public_email,
            avatar: row.avatar,
            url: row.url,
            organization: row.organization,
            location: row.location,
            social: SocialAccounts {
                github: row.github,
                twitter: row.twitter,
                stack_overflow: row.stack_overflow,
                linkedin: row.linkedin,
            },
            packages_count: row.packages_count,
            joined_at: row.joined_at.and_utc(),
        }
    }
}
