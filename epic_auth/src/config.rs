//! Central configuration for the epic_auth crate

use chrono::Duration;
use std::env;

use crate::two_factor::{TotpAlgorithm, TotpParams};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "en_session";
pub const DEFAULT_VERIFICATION_COOKIE_NAME: &str = "en_verification";
const DEFAULT_SESSION_SECONDS: i64 = 60 * 60 * 24 * 30;
const DEFAULT_PENDING_LOGIN_SECONDS: i64 = 60 * 10;
const DEFAULT_TOTP_ISSUER: &str = "Epic Notes";
const DEFAULT_TOTP_SKEW: u8 = 1;

/// Everything an [`Auth`](crate::Auth) instance needs, passed in explicitly.
///
/// `AuthConfig::from_env()` is the usual way to build one; tests construct it
/// directly with [`AuthConfig::for_secrets`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Name of the cookie carrying the signed session id
    pub session_cookie_name: String,
    /// Name of the cookie carrying the signed pending 2FA login
    pub verification_cookie_name: String,
    /// Signing secrets; the first signs, all of them verify
    pub session_secrets: Vec<String>,
    /// Lifetime of a session row (and of a "remember me" cookie)
    pub session_ttl: Duration,
    /// Lifetime of a pending 2FA login
    pub pending_login_ttl: Duration,
    /// Whether cookies carry the `Secure` attribute
    pub secure_cookies: bool,
    /// Issuer shown in authenticator apps
    pub totp_issuer: String,
    /// Parameters for newly provisioned TOTP secrets
    pub totp_params: TotpParams,
    /// Accepted time steps on either side of the current one
    pub totp_skew: u8,
}

impl AuthConfig {
    /// Build a development configuration around the given signing secrets.
    pub fn for_secrets<S: Into<String>>(secrets: impl IntoIterator<Item = S>) -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            verification_cookie_name: DEFAULT_VERIFICATION_COOKIE_NAME.to_string(),
            session_secrets: secrets.into_iter().map(Into::into).collect(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_SECONDS),
            pending_login_ttl: Duration::seconds(DEFAULT_PENDING_LOGIN_SECONDS),
            secure_cookies: false,
            totp_issuer: DEFAULT_TOTP_ISSUER.to_string(),
            totp_params: TotpParams::default(),
            totp_skew: DEFAULT_TOTP_SKEW,
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SESSION_SECRET` (comma separated) | required |
    /// | `SESSION_COOKIE_NAME` | `en_session` |
    /// | `VERIFICATION_COOKIE_NAME` | `en_verification` |
    /// | `SESSION_EXPIRATION_SECONDS` | 30 days |
    /// | `PENDING_LOGIN_SECONDS` | 600 |
    /// | `APP_ENV` | `development` (`production` turns on `Secure`) |
    /// | `TOTP_ISSUER` | `Epic Notes` |
    /// | `TOTP_ALGORITHM` / `TOTP_DIGITS` / `TOTP_PERIOD` | `SHA1` / 6 / 30 |
    /// | `TOTP_SKEW` | 1 |
    pub fn from_env() -> Self {
        let secrets = parse_secrets(env::var("SESSION_SECRET").ok().as_deref());
        let defaults = TotpParams::default();

        Self {
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE_NAME.to_string()),
            verification_cookie_name: env::var("VERIFICATION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_VERIFICATION_COOKIE_NAME.to_string()),
            session_secrets: secrets,
            session_ttl: Duration::seconds(env_parse(
                "SESSION_EXPIRATION_SECONDS",
                DEFAULT_SESSION_SECONDS,
            )),
            pending_login_ttl: Duration::seconds(env_parse(
                "PENDING_LOGIN_SECONDS",
                DEFAULT_PENDING_LOGIN_SECONDS,
            )),
            secure_cookies: is_production(env::var("APP_ENV").ok().as_deref()),
            totp_issuer: env::var("TOTP_ISSUER").unwrap_or_else(|_| DEFAULT_TOTP_ISSUER.to_string()),
            totp_params: TotpParams {
                algorithm: env::var("TOTP_ALGORITHM")
                    .ok()
                    .and_then(|s| s.parse::<TotpAlgorithm>().ok())
                    .unwrap_or(defaults.algorithm),
                digits: Some(env_parse("TOTP_DIGITS", defaults.digits))
                    .filter(|d| TotpParams::DIGITS.contains(d))
                    .unwrap_or(defaults.digits),
                period: env_parse("TOTP_PERIOD", defaults.period),
            },
            totp_skew: env_parse("TOTP_SKEW", DEFAULT_TOTP_SKEW),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn parse_secrets(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn is_production(app_env: Option<&str>) -> bool {
    matches!(app_env, Some(v) if v.eq_ignore_ascii_case("production"))
}
