use crate::auth::{PrincipalResolver, StoreResolver};
use pkgx_registry::{PackageStore, UserStore};
use pkgx_search::entities;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub packages: PackageStore,
    pub users: UserStore,
    pub resolver: Arc<dyn PrincipalResolver>,
}

impl AppState {
    /// Build the stores and the default credential resolver over `pool`.
    pub fn new(pool: SqlitePool) -> pkgx_search::Result<Self> {
        let packages = PackageStore::new(pool.clone(), Arc::new(entities::packages()?));
        let users = UserStore::new(pool, Arc::new(entities::users()?));
        let resolver = Arc::new(StoreResolver::new(users.clone()));

        Ok(Self {
            packages,
            users,
            resolver,
        })
    }

    /// Swap the credential resolver, e.g. for an external identity service.
    pub fn with_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}
