//! epic_auth_axum - axum pages, extractor and middleware for `epic_auth`

mod config;
mod error;
mod middleware;
mod pages;
mod router;
mod session;

pub use config::{EPIC_LOGIN_URL, EPIC_REDIRECT_ANON, EPIC_REDIRECT_USER};
pub use middleware::{is_authenticated_or_error, is_authenticated_or_redirect};
pub use router::{epic_auth_router, epic_auth_router_no_trace};
pub use session::{AuthRedirect, AuthUser};

pub use epic_auth::{Auth, AuthConfig, DataStore};
