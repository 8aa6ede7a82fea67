use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;
use url::Url;

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Fill `len` bytes from the system CSPRNG.
pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Random base64url string built from `len` random bytes.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let bytes = gen_random_bytes(len)?;
    Ok(base64url_encode(&bytes))
}

/// Append a `Set-Cookie` header.
///
/// `max_age: None` makes a browser-session cookie. `Secure` is only added when asked for,
/// so plain-http development servers keep working.
pub(crate) fn header_set_cookie<'a>(
    headers: &'a mut HeaderMap,
    name: &str,
    value: &str,
    max_age: Option<i64>,
    secure: bool,
) -> Result<&'a HeaderMap, UtilError> {
    let mut cookie = format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(headers)
}

/// Append a `Set-Cookie` header that removes the cookie.
pub(crate) fn header_clear_cookie<'a>(
    headers: &'a mut HeaderMap,
    name: &str,
    secure: bool,
) -> Result<&'a HeaderMap, UtilError> {
    header_set_cookie(headers, name, "", Some(0), secure)
}

/// Accept only same-site relative paths as post-login redirect targets.
///
/// The target must be visible ASCII (browsers drop tabs and newlines, turning
/// `/\t/host` into `//host`), must not be protocol-relative or contain a
/// backslash, and must resolve to the same origin as the page it came from.
pub fn safe_redirect(target: Option<&str>, fallback: &str) -> String {
    match target {
        Some(t) if is_same_site_path(t) => t.to_string(),
        _ => fallback.to_string(),
    }
}

fn is_same_site_path(target: &str) -> bool {
    if !target.starts_with('/')
        || target.starts_with("//")
        || !target.bytes().all(|b| b.is_ascii_graphic() && b != b'\\')
    {
        return false;
    }

    let Ok(base) = Url::parse("http://localhost/") else {
        return false;
    };
    base.join(target)
        .map(|joined| joined.origin() == base.origin())
        .unwrap_or(false)
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}
