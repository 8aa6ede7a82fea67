//! epic_auth - session-cookie and TOTP two-factor authentication core
//!
//! The crate keeps users, password hashes, sessions and TOTP secrets in SQLite or
//! PostgreSQL, signs session cookies with rotating HMAC keys and orchestrates
//! signup, login (with an optional second factor) and logout. Web framework
//! glue lives in `epic_auth_axum`.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use epic_auth::{Auth, AuthConfig, DataStore};
//!
//! let store = DataStore::connect("sqlite:notes.db").await?;
//! let auth = Auth::new(AuthConfig::from_env(), store).await?;
//! # let _ = auth;
//! # Ok(())
//! # }
//! ```

mod config;
mod coordination;
mod session;
mod storage;
mod two_factor;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{AuthConfig, DEFAULT_SESSION_COOKIE_NAME, DEFAULT_VERIFICATION_COOKIE_NAME};

pub use coordination::{
    Auth, CoordinationError, FieldError, LoginOutcome, LoginRequest, NewUser, ProfileUpdate,
};

pub use session::{
    AuthenticatedSession, PendingLogin, Session, SessionCodec, SessionError, SessionStore,
    SessionUser,
};

pub use storage::{DB_TABLE_PREFIX, DataStore, StorageError};

pub use two_factor::{
    Provisioning, ProvisioningUri, TotpAlgorithm, TotpParams, TwoFactorError, TwoFactorSecret,
    TwoFactorService, TwoFactorState, TwoFactorStore, parse_provisioning_uri, provisioning_uri,
    totp,
};

pub use userdb::{User, UserError, UserSearchField, UserStore, hash_password};

pub use utils::{UtilError, gen_random_string, safe_redirect};
