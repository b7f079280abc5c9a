//! Built-in schemas for the two searchable entities.
//!
//! The qualifier and sort vocabularies here are part of the public API:
//! clients write them in search strings and `sort` parameters.

use crate::clause::Column;
use crate::error::Result;
use crate::mapping::ColumnMapping;
use crate::search::{QualifierKind, SearchSchema};

pub const PACKAGES_MAX_PAGE_SIZE: u64 = 100;
pub const USERS_MAX_PAGE_SIZE: u64 = 100;

pub const PACKAGE_IN_FIELDS: &[&str] = &["name", "desc", "tag"];
const PACKAGE_IN_COLUMNS: &[&str] = &["name", "description", "tag"];

pub const PACKAGE_SORT_KEYS: &[&str] = &["downloads", "created", "updated", "name", "id"];
const PACKAGE_SORT_COLUMNS: &[&str] = &["downloads", "published_at", "last_released_at", "name", "id"];
pub const PACKAGE_DEFAULT_SORT: &str = "downloads";

pub const USER_IN_FIELDS: &[&str] = &["username", "name", "email"];

pub const USER_SORT_KEYS: &[&str] = &["joined", "packages", "username", "id"];
const USER_SORT_COLUMNS: &[&str] = &["joined_at", "packages_count", "username", "id"];
pub const USER_DEFAULT_SORT: &str = "joined";

/// Package search: `in:name,desc,tag created: updated: downloads: owner:`.
pub fn packages() -> Result<SearchSchema> {
    const ENTITY: &str = "packages";

    Ok(SearchSchema::new(
        ENTITY,
        ColumnMapping::new(ENTITY, PACKAGE_IN_FIELDS, PACKAGE_IN_COLUMNS)?,
        ColumnMapping::new(ENTITY, PACKAGE_SORT_KEYS, PACKAGE_SORT_COLUMNS)?,
        PACKAGE_DEFAULT_SORT,
        PACKAGES_MAX_PAGE_SIZE,
    )?
    .with_qualifier("created", QualifierKind::Relational(Column::new("published_at")))
    .with_qualifier("updated", QualifierKind::Relational(Column::new("last_released_at")))
    .with_qualifier("downloads", QualifierKind::Relational(Column::new("downloads")))
    .with_qualifier("owner", QualifierKind::Exact(Column::new("owner_username"))))
}

/// User search: `in:username,name,email packages: location: joined:`.
pub fn users() -> Result<SearchSchema> {
    const ENTITY: &str = "users";

    Ok(SearchSchema::new(
        ENTITY,
        ColumnMapping::identity(ENTITY, USER_IN_FIELDS)?,
        ColumnMapping::new(ENTITY, USER_SORT_KEYS, USER_SORT_COLUMNS)?,
        USER_DEFAULT_SORT,
        USERS_MAX_PAGE_SIZE,
    )?
    .with_qualifier("packages", QualifierKind::Relational(Column::new("packages_count")))
    .with_qualifier("location", QualifierKind::MultiWord(Column::new("location")))
    .with_qualifier("joined", QualifierKind::Relational(Column::new("joined_at"))))
}
