use chrono::Utc;
use headers::Cookie;
use http::HeaderMap;
use std::fmt;

use crate::session::{PendingLogin, Session};
use crate::two_factor::{TwoFactorError, TwoFactorState};
use crate::userdb::{UserSearchField, verify_dummy_password, verify_password};
use crate::utils::{UtilError, header_clear_cookie, header_set_cookie, safe_redirect};

use super::auth::Auth;
use super::errors::CoordinationError;

/// Password step input
#[derive(Clone, Default)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
    /// Keep the session cookie after the browser closes
    pub remember: bool,
    /// Where to go afterwards; only same-site paths are honored
    pub redirect_to: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("remember", &self.remember)
            .field("redirect_to", &self.redirect_to)
            .finish()
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// A session was created; `headers` set the session cookie
    LoggedIn {
        headers: HeaderMap,
        redirect_to: String,
    },
    /// Password accepted but a code is still owed; `headers` set the verification cookie
    TwoFactorRequired(HeaderMap),
}

impl Auth {
    /// Check a username/email and password.
    ///
    /// Users with two-factor enabled get a short-lived verification cookie and
    /// no session; everyone else gets a session straight away.
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, CoordinationError> {
        let identifier = request.username.trim();
        let field = if identifier.contains('@') {
            UserSearchField::Email(identifier.to_string())
        } else {
            UserSearchField::Username(identifier.to_string())
        };

        let Some(user) = self.users().get_user_by(field).await? else {
            let password = request.password.clone();
            run_blocking(move || verify_dummy_password(&password)).await?;
            return Err(CoordinationError::InvalidCredentials.log());
        };

        let password = request.password.clone();
        let valid = match self.users().get_password_hash(&user.id).await? {
            Some(hash) => run_blocking(move || verify_password(&password, &hash)).await?,
            None => run_blocking(move || verify_dummy_password(&password)).await?,
        };
        if !valid {
            return Err(CoordinationError::InvalidCredentials.log());
        }

        let redirect_to = safe_redirect(request.redirect_to.as_deref(), "/");

        if self.two_factor().state(&user.id).await? == TwoFactorState::Enabled {
            let pending = PendingLogin {
                user_id: user.id.clone(),
                expires_at: Utc::now() + self.config().pending_login_ttl,
                remember: request.remember,
                redirect_to: Some(redirect_to),
            };
            let mut headers = HeaderMap::new();
            header_set_cookie(
                &mut headers,
                &self.config().verification_cookie_name,
                &self.codec().sign(&pending)?,
                Some(self.config().pending_login_ttl.num_seconds()),
                self.config().secure_cookies,
            )?;
            tracing::info!(user_id = %user.id, "Password accepted, two-factor code required");
            return Ok(LoginOutcome::TwoFactorRequired(headers));
        }

        let headers = self.issue_session(&user.id, request.remember).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome::LoggedIn {
            headers,
            redirect_to,
        })
    }

    /// The pending login named by the verification cookie
    pub fn pending_login(&self, cookies: &Cookie) -> Result<PendingLogin, CoordinationError> {
        let value = cookies
            .get(&self.config().verification_cookie_name)
            .ok_or(CoordinationError::Unauthenticated)?;
        let pending: PendingLogin = self.codec().unsign(value)?;
        if pending.is_expired_at(Utc::now()) {
            return Err(CoordinationError::SessionExpired);
        }
        Ok(pending)
    }

    /// Finish a login with the one-time code.
    ///
    /// On success returns headers that set the session cookie and clear the
    /// verification cookie, plus where to redirect. No session is created on
    /// any failure.
    #[tracing::instrument(skip(self, cookies, code))]
    pub async fn complete_two_factor_login(
        &self,
        cookies: &Cookie,
        code: &str,
    ) -> Result<(HeaderMap, String), CoordinationError> {
        let pending = self.pending_login(cookies)?;

        match self
            .two_factor()
            .verify_login(&pending.user_id, code, Utc::now())
            .await
        {
            Ok(()) => {}
            Err(TwoFactorError::NotEnabled) => {
                tracing::info!(user_id = %pending.user_id, "Two-factor no longer enabled");
                return Err(CoordinationError::Unauthenticated);
            }
            Err(e) => return Err(e.into()),
        }

        let user = self
            .users()
            .get_user(&pending.user_id)
            .await?
            .ok_or(CoordinationError::Unauthenticated)?;

        let mut headers = self.issue_session(&user.id, pending.remember).await?;
        header_clear_cookie(
            &mut headers,
            &self.config().verification_cookie_name,
            self.config().secure_cookies,
        )?;

        tracing::info!(user_id = %user.id, "User logged in with two-factor code");
        Ok((headers, safe_redirect(pending.redirect_to.as_deref(), "/")))
    }

    /// Create a session row and the cookie naming it
    pub(super) async fn issue_session(
        &self,
        user_id: &str,
        remember: bool,
    ) -> Result<HeaderMap, CoordinationError> {
        let session = Session::new(user_id, self.config().session_ttl)?;
        self.sessions().insert(&session).await?;

        let max_age = remember.then(|| self.config().session_ttl.num_seconds());
        let mut headers = HeaderMap::new();
        header_set_cookie(
            &mut headers,
            &self.config().session_cookie_name,
            &self.codec().encode(&session.id)?,
            max_age,
            self.config().secure_cookies,
        )?;
        Ok(headers)
    }
}

/// Argon2 is CPU-bound; keep it off the async workers
pub(super) async fn run_blocking<T, F>(f: F) -> Result<T, CoordinationError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| UtilError::Crypto(e.to_string()).into())
}
