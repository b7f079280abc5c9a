use pkgx_registry::{Package, PackageVersion, Readme, SocialAccounts, User, VersionHistory};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::routes::packages::DownloadStats;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::search::search_packages,
        crate::routes::search::search_users,
        crate::routes::packages::list_packages,
        crate::routes::packages::get_package,
        crate::routes::packages::get_readme,
        crate::routes::packages::get_versions,
        crate::routes::packages::get_downloads,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::list_user_packages,
        crate::routes::users::get_current_user,
        crate::routes::users::list_current_user_packages,
    ),
    components(
        schemas(
            Package,
            PackageVersion,
            VersionHistory,
            Readme,
            User,
            SocialAccounts,
            DownloadStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "pkgx-api", description = "Package registry API")
    )
)]
pub struct ApiDoc;

/// `Authorization: Basic <base64 user:pass>` or `Authorization: APIKey <key>`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
        );
    }
}
