//! Error types for authentication orchestration

use thiserror::Error;

use crate::session::SessionError;
use crate::two_factor::TwoFactorError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// A single rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Errors that can occur during authentication orchestration
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// No valid session, or no valid pending login
    #[error("Not authenticated")]
    Unauthenticated,

    /// Unknown account or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Wrong, expired or reused one-time code
    #[error("Invalid two-factor code")]
    InvalidTwoFactorCode,

    /// The pending login or session ran out
    #[error("Session expired")]
    SessionExpired,

    /// Email or username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before touching storage
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Error from the user database operations
    #[error("User error: {0}")]
    UserError(UserError),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from two-factor operations
    #[error("Two-factor error: {0}")]
    TwoFactorError(TwoFactorError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Unauthenticated => tracing::debug!("Not authenticated"),
            Self::InvalidCredentials => tracing::info!("Invalid credentials"),
            Self::InvalidTwoFactorCode => tracing::info!("Invalid two-factor code"),
            Self::SessionExpired => tracing::debug!("Session expired"),
            Self::Conflict(message) => tracing::info!("Conflict: {}", message),
            Self::Validation(errors) => {
                tracing::debug!("Validation failed: {}", join_field_errors(errors))
            }
            Self::UserError(err) => tracing::error!("User error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::TwoFactorError(err) => tracing::error!("Two-factor error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }

    /// Text that is safe to show the person on the other end of the request
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::InvalidTwoFactorCode => "Invalid code".to_string(),
            Self::Unauthenticated => "You must be logged in".to_string(),
            Self::SessionExpired => "Your login has expired, please log in again".to_string(),
            Self::Conflict(message) => message.clone(),
            Self::Validation(errors) => errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join(". "),
            Self::UserError(_)
            | Self::SessionError(_)
            | Self::TwoFactorError(_)
            | Self::UtilsError(_) => "Something went wrong, please try again".to_string(),
        }
    }
}

// Custom From implementations that automatically log errors

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthenticated | SessionError::InvalidCookie => {
                tracing::debug!("{}", err);
                Self::Unauthenticated
            }
            err => {
                let error = Self::SessionError(err);
                tracing::error!("{}", error);
                error
            }
        }
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Conflict(message) => {
                tracing::info!("Conflict: {}", message);
                Self::Conflict("A user with that email or username already exists".to_string())
            }
            err => {
                let error = Self::UserError(err);
                tracing::error!("{}", error);
                error
            }
        }
    }
}

impl From<TwoFactorError> for CoordinationError {
    fn from(err: TwoFactorError) -> Self {
        match err {
            TwoFactorError::InvalidCode => Self::InvalidTwoFactorCode,
            err => {
                let error = Self::TwoFactorError(err);
                tracing::error!("{}", error);
                error
            }
        }
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}
