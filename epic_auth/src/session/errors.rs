use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// No usable session: missing, tampered, unknown, expired, or its user is gone
    #[error("Not authenticated")]
    Unauthenticated,

    /// Cookie value failed signature or format checks
    #[error("Invalid cookie")]
    InvalidCookie,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Session storage error");
        SessionError::Storage(err.to_string())
    }
}
