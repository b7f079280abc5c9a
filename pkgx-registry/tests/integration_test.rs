//! Integration tests for pkgx-registry
//!
//! Runs compiled searches and the fixed lookups against an in-memory
//! database seeded with a handful of users and packages.

use pkgx_registry::test_utils::{
    create_test_db, insert_package, insert_readme, insert_user, PackageFixture, UserFixture,
};
use pkgx_registry::{PackageStore, RegistryError, SearchPage, UserStore};
use pkgx_search::{entities, tokenize, PaginationConfig, SearchError, SortingConfig};
use sqlx::SqlitePool;
use std::sync::Arc;

async fn seeded() -> (SqlitePool, PackageStore, UserStore) {
    let pool = create_test_db().await;

    let alice = insert_user(
        &pool,
        &UserFixture {
            email: "alice@example.com",
            is_public_email: true,
            password_hash: "alice-hash",
            api_key_hash: Some("alice-key-hash"),
            location: Some("San Francisco"),
            joined_at: "2016-05-01 10:00:00",
            ..UserFixture::new("alice")
        },
    )
    .await;
    let bob = insert_user(
        &pool,
        &UserFixture {
            email: "bob@example.com",
            location: Some("Berlin"),
            joined_at: "2018-02-01 10:00:00",
            ..UserFixture::new("bob")
        },
    )
    .await;

    insert_package(
        &pool,
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
    let json_id = insert_package(
        &pool,
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
        &pool,
        &PackageFixture {
            description: "Say hello",
            downloads: 5,
            published_at: "2021-01-01 00:00:00",
            last_released_at: "2021-01-01 00:00:00",
            ..PackageFixture::new("greeter", bob)
        },
    )
    .await;

    insert_readme(&pool, json_id, "1.0.0", b"# jsonkit").await;

    let packages = PackageStore::new(pool.clone(), Arc::new(entities::packages().unwrap()));
    let users = UserStore::new(pool.clone(), Arc::new(entities::users().unwrap()));

    (pool, packages, users)
}

fn names<T>(page: &SearchPage<T>, name: impl Fn(&T) -> &str) -> Vec<String> {
    page.items.iter().map(|item| name(item).to_string()).collect()
}

#[tokio::test]
async fn test_package_search_filters_by_relational_qualifiers() {
    let (_pool, packages, _users) = seeded().await;

    let found = packages
        .search(
            &tokenize("hello in:name,desc downloads:>=1000 created:2020-01-01..2020-12-31"),
            &PaginationConfig::default(),
            &SortingConfig::default(),
        )
        .await
        .expect("search should succeed");

    assert_eq!(names(&found, |p| &p.name), vec!["hello-ws"]);
    assert_eq!(found.items[0].downloads, 1500);
    assert_eq!(found.items[0].owner, "alice");
    assert_eq!(found.items[0].tags.len(), 2);
}

#[tokio::test]
async fn test_package_term_matches_description_and_tags() {
    let (_pool, packages, _users) = seeded().await;

    let by_desc = packages
        .search(
            &tokenize("hello in:desc"),
            &PaginationConfig::default(),
            &SortingConfig::new("name", "asc"),
        )
        .await
        .unwrap();
    assert_eq!(names(&by_desc, |p| &p.name), vec!["greeter"]);

    let by_tag = packages
        .search(
            &tokenize("websocket in:tag"),
            &PaginationConfig::default(),
            &SortingConfig::default(),
        )
        .await
        .unwrap();
    assert_eq!(names(&by_tag, |p| &p.name), vec!["hello-ws"]);
}

#[tokio::test]
async fn test_package_downloads_compare_numerically() {
    let (_pool, packages, _users) = seeded().await;

    let found = packages
        .search(
            &tokenize("downloads:5..100"),
            &PaginationConfig::default(),
            &SortingConfig::new("downloads", "desc"),
        )
        .await
        .unwrap();

    assert_eq!(names(&found, |p| &p.name), vec!["jsonkit", "greeter"]);
}

#[tokio::test]
async fn test_package_owner_sort_and_paging() {
    let (_pool, packages, _users) = seeded().await;

    let first_page = packages
        .search(
            &tokenize("owner:alice"),
            &PaginationConfig::new(1, 1),
            &SortingConfig::new("created", "DESC"),
        )
        .await
        .unwrap();
    let second_page = packages
        .search(
            &tokenize("owner:alice"),
            &PaginationConfig::new(2, 1),
            &SortingConfig::new("created", "DESC"),
        )
        .await
        .unwrap();

    assert_eq!(names(&first_page, |p| &p.name), vec!["hello-ws"]);
    assert_eq!(names(&second_page, |p| &p.name), vec!["jsonkit"]);
    assert_eq!((second_page.page, second_page.per_page), (2, 1));
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let (_pool, packages, users) = seeded().await;
    let pagination = PaginationConfig::from_raw(Some("18446744073709551615"), Some("100"));

    let found = packages
        .search(&tokenize(""), &pagination, &SortingConfig::default())
        .await
        .unwrap();
    assert!(found.items.is_empty());
    assert_eq!(found.per_page, 100);

    let found = users
        .search(&tokenize(""), &pagination, &SortingConfig::default())
        .await
        .unwrap();
    assert!(found.items.is_empty());
}

#[tokio::test]
async fn test_hostile_query_is_treated_as_data() {
    let (pool, packages, _users) = seeded().await;

    let found = packages
        .search(
            &tokenize("x');DROP+TABLE+packages;-- owner:'OR'1'='1"),
            &PaginationConfig::default(),
            &SortingConfig::new("name;DROP TABLE packages", "DESC"),
        )
        .await
        .unwrap();
    assert!(found.items.is_empty());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_malformed_relational_value_is_an_error() {
    let (_pool, packages, _users) = seeded().await;

    let err = packages
        .search(
            &tokenize("downloads:+"),
            &PaginationConfig::default(),
            &SortingConfig::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RegistryError::Search(SearchError::MalformedValue { .. })
    ));
}

#[tokio::test]
async fn test_get_package_and_versions() {
    let (_pool, packages, _users) = seeded().await;

    let package = packages.get("hello-ws").await.unwrap();
    assert_eq!(package.latest_version, "1.0.0");
    assert_eq!(package.description.as_deref(), Some("Fast websocket server"));

    let history = packages.versions("hello-ws").await.unwrap();
    assert_eq!(history.name, "hello-ws");
    assert_eq!(
        history
            .versions
            .iter()
            .map(|v| v.version.as_str())
            .collect::<Vec<_>>(),
        vec!["0.1.0", "1.0.0"]
    );

    assert!(packages.version_exists("hello-ws", "0.1.0").await.unwrap());
    assert!(!packages.version_exists("hello-ws", "9.9.9").await.unwrap());

    assert!(matches!(
        packages.get("missing").await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        packages.versions("missing").await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_readme_is_base64_encoded() {
    let (_pool, packages, _users) = seeded().await;

    let readme = packages.readme("jsonkit", None).await.unwrap();
    assert_eq!(readme.name, "README.md");
    assert_eq!(readme.version, "1.0.0");
    assert_eq!(readme.size, 9);
    assert_eq!(readme.content, "IyBqc29ua2l0");

    assert!(matches!(
        packages.readme("hello-ws", None).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_total_downloads() {
    let (_pool, packages, _users) = seeded().await;

    assert_eq!(packages.total_downloads().await.unwrap(), 1525);
}

#[tokio::test]
async fn test_user_search_by_location_and_package_count() {
    let (_pool, _packages, users) = seeded().await;

    let found = users
        .search(
            &tokenize("location:San+Francisco packages:>=2"),
            &PaginationConfig::default(),
            &SortingConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(names(&found, |u| &u.username), vec!["alice"]);
    assert_eq!(found.items[0].packages_count, 2);
    assert_eq!(found.items[0].email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn test_user_search_hides_private_email() {
    let (_pool, _packages, users) = seeded().await;

    let found = users
        .search(
            &tokenize("joined:>2017-01-01"),
            &PaginationConfig::default(),
            &SortingConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(names(&found, |u| &u.username), vec!["bob"]);
    assert_eq!(found.items[0].email, None);

    let bob = users.get("bob").await.unwrap();
    assert_eq!(bob.email, None);
    assert!(matches!(
        users.get("nobody").await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_principal_lookups() {
    let (_pool, _packages, users) = seeded().await;

    let by_login = users
        .find_by_login("alice", "alice-hash")
        .await
        .unwrap()
        .expect("alice should resolve");
    assert_eq!(by_login.username, "alice");

    let by_key = users
        .find_by_api_key("alice-key-hash")
        .await
        .unwrap()
        .expect("api key should resolve");
    assert_eq!(by_key.id, by_login.id);

    assert!(users
        .find_by_login("alice", "wrong")
        .await
        .unwrap()
        .is_none());
    assert!(users.find_by_api_key("nope").await.unwrap().is_none());
}
