//! Package registry data access
//!
//! This crate owns every statement run against the registry database. Search
//! endpoints hand it a [`pkgx_search::CompiledSearch`]; the fixed lookups
//! (single package, version history, README, download totals, principals)
//! live next to them. It is consumed by the pkgx-api HTTP service.

pub mod db;
pub mod error;
pub mod package;
pub mod page;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod user;

pub use error::{RegistryError, Result};
pub use page::SearchPage;
pub use package::{Package, PackageStore, PackageVersion, Readme, VersionHistory};
pub use user::{SocialAccounts, User, UserStore};
