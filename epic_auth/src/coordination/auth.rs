use std::fmt;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::session::{SessionCodec, SessionStore};
use crate::storage::DataStore;
use crate::two_factor::{TwoFactorError, TwoFactorService, TwoFactorStore};
use crate::userdb::UserStore;

use super::errors::CoordinationError;

/// Authentication entry point.
///
/// Owns the signing keys and the stores. Cheap to clone; meant to be shared as
/// application state.
#[derive(Clone)]
pub struct Auth {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    config: AuthConfig,
    codec: SessionCodec,
    users: UserStore,
    sessions: SessionStore,
    two_factor: TwoFactorService,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("session_cookie_name", &self.inner.config.session_cookie_name)
            .field("codec", &self.inner.codec)
            .finish_non_exhaustive()
    }
}

impl Auth {
    /// Build an `Auth` on top of `store`, creating and validating its tables.
    pub async fn new(config: AuthConfig, store: DataStore) -> Result<Self, CoordinationError> {
        let codec = SessionCodec::new(&config.session_secrets)?;
        if !config.totp_params.has_valid_digits() {
            return Err(TwoFactorError::InvalidSecret(format!(
                "TOTP digits must be 6 to 8, got {}",
                config.totp_params.digits
            ))
            .into());
        }

        let users = UserStore::new(store.clone());
        let sessions = SessionStore::new(store.clone());
        let two_factor = TwoFactorService::new(
            TwoFactorStore::new(store),
            config.totp_issuer.clone(),
            config.totp_params,
            config.totp_skew,
        );

        users.init().await?;
        sessions.init().await?;
        two_factor.init().await?;

        tracing::info!("Authentication stores initialized");

        Ok(Self {
            inner: Arc::new(AuthInner {
                config,
                codec,
                users,
                sessions,
                two_factor,
            }),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.inner.codec
    }

    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn two_factor(&self) -> &TwoFactorService {
        &self.inner.two_factor
    }
}
