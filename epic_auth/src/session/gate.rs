//! Deciding whether a request carries a live session

use chrono::{DateTime, Utc};
use headers::{Cookie, HeaderMapExt};
use http::HeaderMap;

use crate::coordination::Auth;

use super::errors::SessionError;
use super::types::{AuthenticatedSession, Session, SessionUser};

impl Auth {
    /// Resolve the session cookie to its session and user.
    ///
    /// Missing, tampered, unknown or expired sessions, and sessions whose user
    /// no longer exists, all come back as [`SessionError::Unauthenticated`].
    /// Storage failures come back as [`SessionError::Storage`]. Nothing is written.
    pub async fn resolve(&self, cookies: &Cookie) -> Result<AuthenticatedSession, SessionError> {
        let Some(value) = cookies.get(&self.config().session_cookie_name) else {
            tracing::debug!("No session cookie");
            return Err(SessionError::Unauthenticated);
        };

        let session = self.decode_session(value).await?;

        let user = self
            .users()
            .get_user(&session.user_id)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?
            .ok_or_else(|| {
                tracing::debug!(user_id = %session.user_id, "Session user no longer exists");
                SessionError::Unauthenticated
            })?;

        Ok(AuthenticatedSession {
            session_id: session.id,
            expires_at: session.expires_at,
            user: SessionUser::from(user),
        })
    }

    /// [`resolve`](Self::resolve) straight from request headers
    pub async fn resolve_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<AuthenticatedSession, SessionError> {
        let Some(cookies) = headers.typed_get::<Cookie>() else {
            tracing::debug!("No cookie header");
            return Err(SessionError::Unauthenticated);
        };
        self.resolve(&cookies).await
    }

    /// Cookie value → live session row
    pub async fn decode_session(&self, cookie_value: &str) -> Result<Session, SessionError> {
        let session_id = self.codec().decode(cookie_value).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session cookie");
            SessionError::Unauthenticated
        })?;

        let Some(session) = self.sessions().get(&session_id).await? else {
            tracing::debug!("Session not found");
            return Err(SessionError::Unauthenticated);
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(expires_at = %session.expires_at, "Session expired");
            return Err(SessionError::Unauthenticated);
        }

        Ok(session)
    }

    /// Push a live session's expiry out by the configured lifetime; expired sessions stay expired
    #[tracing::instrument(skip(self, session_id))]
    pub async fn extend_session(&self, session_id: &str) -> Result<DateTime<Utc>, SessionError> {
        let now = Utc::now();
        let expires_at = now + self.config().session_ttl;
        if !self.sessions().set_expiry(session_id, expires_at, now).await? {
            return Err(SessionError::Unauthenticated);
        }
        Ok(expires_at)
    }
}
