//! Server-rendered authentication pages

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;

use epic_auth::Auth;

use crate::session::AuthUser;

mod index;
mod login;
mod logout;
mod profile;
mod settings;
mod signup;
mod two_factor;

pub(crate) const LOGIN_TWO_FACTOR_PATH: &str = "/login/2fa";
pub(crate) const PROFILE_SETTINGS_PATH: &str = "/settings/profile";
pub(crate) const TWO_FACTOR_PATH: &str = "/settings/profile/two-factor";
pub(crate) const TWO_FACTOR_VERIFY_PATH: &str = "/settings/profile/two-factor/verify";

pub(crate) fn router() -> Router<Auth> {
    Router::new()
        .route("/", get(index::index))
        .route("/signup", get(signup::signup_page).post(signup::signup))
        .route("/login", get(login::login_page).post(login::login))
        .route(
            LOGIN_TWO_FACTOR_PATH,
            get(login::two_factor_page).post(login::two_factor),
        )
        .route("/logout", post(logout::logout))
        .route("/users/{username}", get(profile::user_profile))
        .route(
            PROFILE_SETTINGS_PATH,
            get(settings::profile_page).post(settings::update_profile),
        )
        .route(
            "/settings/profile/sessions",
            post(settings::logout_other_sessions),
        )
        .route(
            TWO_FACTOR_PATH,
            get(two_factor::status_page).post(two_factor::begin_enable),
        )
        .route(
            TWO_FACTOR_VERIFY_PATH,
            get(two_factor::verify_page).post(two_factor::verify),
        )
        .route(
            "/settings/profile/two-factor/disable",
            post(two_factor::disable),
        )
}

/// Header navigation for a logged-in visitor
#[derive(Debug, Clone)]
pub(crate) struct Nav {
    pub(crate) name: String,
    pub(crate) username: String,
}

impl From<&AuthUser> for Nav {
    fn from(user: &AuthUser) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
        }
    }
}

pub(crate) fn nav_for(user: Option<&AuthUser>) -> Option<Nav> {
    user.map(Nav::from)
}

/// One-time code form, used by both login and 2FA setup
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CodeForm {
    pub(crate) code: String,
}

pub(crate) fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render template: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}
