use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use http::{Method, StatusCode, request::Parts};

use epic_auth::{Auth, AuthenticatedSession, SessionUser};

use super::config::login_url_for;

/// Rejection for requests without a valid session.
///
/// Page loads (GET) are sent to the login page with `redirectTo` pointing back
/// at the requested path; everything else gets a bare 401.
#[derive(Debug)]
pub struct AuthRedirect {
    method: Method,
    path: String,
}

impl AuthRedirect {
    pub(crate) fn new(method: Method, path: String) -> Self {
        Self { method, path }
    }

    pub(crate) fn from_parts(parts: &Parts) -> Self {
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        Self::new(parts.method.clone(), path)
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        if self.method == Method::GET {
            let target = login_url_for(&self.path);
            tracing::debug!("Redirecting to {}", target);
            Redirect::temporary(&target).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Authenticated user information, available as an Axum extractor
///
/// The router state must expose an [`Auth`] through `FromRef`. Use
/// `Option<AuthUser>` on pages that also serve anonymous visitors.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use epic_auth::Auth;
/// use epic_auth_axum::AuthUser;
///
/// async fn protected_handler(user: AuthUser) -> String {
///     format!("Hello, {}!", user.name)
/// }
///
/// fn app(auth: Auth) -> Router {
///     Router::new()
///         .route("/protected", get(protected_handler))
///         .with_state(auth)
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// Unique user identifier
    pub id: String,
    pub email: String,
    pub username: String,
    /// Display name
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Session the request was authenticated with
    pub session_id: String,
    pub session_expires_at: DateTime<Utc>,
}

impl AuthUser {
    /// The session this user was resolved from, for orchestration calls that take one
    pub fn to_authenticated_session(&self) -> AuthenticatedSession {
        AuthenticatedSession {
            session_id: self.session_id.clone(),
            expires_at: self.session_expires_at,
            user: SessionUser {
                id: self.id.clone(),
                email: self.email.clone(),
                username: self.username.clone(),
                name: self.name.clone(),
                created_at: self.created_at,
            },
        }
    }
}

impl From<AuthenticatedSession> for AuthUser {
    fn from(session: AuthenticatedSession) -> Self {
        AuthUser {
            id: session.user.id,
            email: session.user.email,
            username: session.user.username,
            name: session.user.name,
            created_at: session.user.created_at,
            session_id: session.session_id,
            session_expires_at: session.expires_at,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Auth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by the middleware
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth = Auth::from_ref(state);
        match auth.resolve_headers(&parts.headers).await {
            Ok(session) => Ok(AuthUser::from(session)),
            Err(e) => {
                tracing::debug!(error = %e, "Request is not authenticated");
                Err(AuthRedirect::from_parts(parts))
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    Auth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
