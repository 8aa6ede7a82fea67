//! Router for every authentication page

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use epic_auth::Auth;

/// All authentication pages, wrapped in HTTP tracing
///
/// Serves `/`, `/signup`, `/login`, `/login/2fa`, `/logout`, `/users/{username}`
/// and the `/settings/profile` pages. The application supplies the [`Auth`]
/// state:
///
/// ```no_run
/// # async fn run(auth: epic_auth::Auth) {
/// let app = epic_auth_axum::epic_auth_router().with_state(auth);
/// # let _: axum::Router = app;
/// # }
/// ```
pub fn epic_auth_router() -> Router<Auth> {
    epic_auth_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`epic_auth_router`] without the tracing layer, for applications that add their own
pub fn epic_auth_router_no_trace() -> Router<Auth> {
    super::pages::router()
}
