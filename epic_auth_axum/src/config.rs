//! Page locations, overridable through the environment

use std::sync::LazyLock;

/// Login page that unauthenticated page requests are sent to
/// Default: "/login"
pub static EPIC_LOGIN_URL: LazyLock<String> =
    LazyLock::new(|| std::env::var("EPIC_LOGIN_URL").unwrap_or_else(|_| "/login".to_string()));

/// Where a login without `redirectTo` lands
/// Default: "/"
pub static EPIC_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| std::env::var("EPIC_REDIRECT_USER").unwrap_or_else(|_| "/".to_string()));

/// Where logout lands
/// Default: "/"
pub static EPIC_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("EPIC_REDIRECT_ANON").unwrap_or_else(|_| "/".to_string()));

/// Login url that brings the user back to `path` afterwards
pub(crate) fn login_url_for(path: &str) -> String {
    login_url_with(EPIC_LOGIN_URL.as_str(), path)
}

fn login_url_with(login_url: &str, path: &str) -> String {
    if path.is_empty() || path == "/" {
        login_url.to_string()
    } else {
        format!("{login_url}?redirectTo={}", urlencoding::encode(path))
    }
}
