use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use epic_auth::Auth;

use super::session::{AuthRedirect, AuthUser};

/// Resolve the session and stash the [`AuthUser`] in the request extensions
async fn authenticate(auth: &Auth, req: &mut Request) -> bool {
    match auth.resolve_headers(req.headers()).await {
        Ok(session) => {
            let user = AuthUser::from(session);
            tracing::debug!(user_id = %user.id, "Request authenticated");
            req.extensions_mut().insert(user);
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "Request is not authenticated");
            false
        }
    }
}

/// Require a session; anything else gets 401.
///
/// ```no_run
/// use axum::{Router, middleware::from_fn_with_state, routing::get};
/// use epic_auth::Auth;
/// use epic_auth_axum::is_authenticated_or_error;
///
/// fn api(auth: Auth) -> Router {
///     Router::new()
///         .route("/api/me", get(|| async { "ok" }))
///         .layer(from_fn_with_state(auth.clone(), is_authenticated_or_error))
///         .with_state(auth)
/// }
/// ```
pub async fn is_authenticated_or_error(
    State(auth): State<Auth>,
    mut req: Request,
    next: Next,
) -> Response {
    if authenticate(&auth, &mut req).await {
        next.run(req).await
    } else {
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

/// Require a session; page loads are redirected to the login page instead
pub async fn is_authenticated_or_redirect(
    State(auth): State<Auth>,
    mut req: Request,
    next: Next,
) -> Response {
    if authenticate(&auth, &mut req).await {
        next.run(req).await
    } else {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());
        AuthRedirect::new(req.method().clone(), path).into_response()
    }
}
