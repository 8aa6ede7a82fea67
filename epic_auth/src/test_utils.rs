//! Shared helpers for unit tests across the crate

use headers::{Cookie, HeaderMapExt};
use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};
use std::sync::LazyLock;

use crate::config::AuthConfig;
use crate::coordination::Auth;
use crate::storage::DataStore;
use crate::userdb::{User, UserStore, hash_password};

/// Password of every user created by [`insert_user`]
pub(crate) const TEST_PASSWORD: &str = "kodylovesyou";

static TEST_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(TEST_PASSWORD).expect("hash test password"));

/// Fresh, private in-memory SQLite database
pub(crate) async fn memory_store() -> DataStore {
    DataStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

/// `Auth` over a fresh in-memory database with development settings
pub(crate) async fn test_auth() -> Auth {
    Auth::new(AuthConfig::for_secrets(["test-secret"]), memory_store().await)
        .await
        .expect("test auth")
}

/// Insert `user_{suffix}` / `{suffix}@example.com` with [`TEST_PASSWORD`]
pub(crate) async fn insert_user(users: &UserStore, suffix: &str) -> User {
    let user = User::new(
        &format!("{suffix}@example.com"),
        &format!("user_{suffix}"),
        &format!("Test {suffix}"),
    );
    users
        .insert_user_with_password(&user, &TEST_PASSWORD_HASH)
        .await
        .expect("insert test user")
}

/// Like [`insert_user`], creating the users table first if needed
pub(crate) async fn insert_test_user(store: &DataStore, suffix: &str) -> User {
    let users = UserStore::new(store.clone());
    users.init().await.expect("init users");
    insert_user(&users, suffix).await
}

/// Request headers carrying a single cookie
pub(crate) fn cookie_header(name: &str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        format!("{name}={value}").parse().expect("cookie header"),
    );
    headers
}

/// The cookies a browser would send back after receiving `headers`' Set-Cookie lines
pub(crate) fn cookies_from(headers: &HeaderMap) -> Cookie {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|c| !c.contains("Max-Age=0"))
        .filter_map(|c| c.split(';').next())
        .collect();
    let mut request = HeaderMap::new();
    request.insert(COOKIE, pairs.join("; ").parse().expect("cookie header"));
    request.typed_get::<Cookie>().expect("cookie")
}
