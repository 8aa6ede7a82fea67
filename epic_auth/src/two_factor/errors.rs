use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum TwoFactorError {
    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    #[error("Two-factor authentication is already enabled")]
    AlreadyEnabled,

    #[error("No two-factor setup is pending")]
    NotPending,

    #[error("Invalid code")]
    InvalidCode,

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid provisioning uri: {0}")]
    InvalidUri(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<sqlx::Error> for TwoFactorError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Two-factor storage error");
        TwoFactorError::Storage(err.to_string())
    }
}
