use headers::Cookie;
use http::HeaderMap;

use crate::session::AuthenticatedSession;
use crate::utils::header_clear_cookie;

use super::auth::Auth;
use super::errors::CoordinationError;

impl Auth {
    /// End the session named by the request's cookie.
    ///
    /// The returned headers clear the session and verification cookies whether or
    /// not the cookie named a live session. A store failure is returned as an error,
    /// since the session row would otherwise stay valid.
    #[tracing::instrument(skip(self, cookies))]
    pub async fn logout(&self, cookies: &Cookie) -> Result<HeaderMap, CoordinationError> {
        let config = self.config();

        if let Some(value) = cookies.get(&config.session_cookie_name) {
            match self.codec().decode(value) {
                Ok(session_id) => {
                    let deleted = self.sessions().delete(&session_id).await?;
                    tracing::debug!(deleted, "Session deleted on logout");
                }
                Err(e) => tracing::debug!(error = %e, "Ignoring undecodable session cookie"),
            }
        }

        let mut headers = HeaderMap::new();
        header_clear_cookie(&mut headers, &config.session_cookie_name, config.secure_cookies)?;
        header_clear_cookie(
            &mut headers,
            &config.verification_cookie_name,
            config.secure_cookies,
        )?;
        Ok(headers)
    }

    /// Sign the user out everywhere except the current session
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user.id))]
    pub async fn logout_other_sessions(
        &self,
        session: &AuthenticatedSession,
    ) -> Result<u64, CoordinationError> {
        let removed = self
            .sessions()
            .delete_for_user_except(&session.user.id, Some(&session.session_id))
            .await?;
        tracing::info!(removed, "Other sessions signed out");
        Ok(removed)
    }
}
