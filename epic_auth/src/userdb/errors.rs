use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Already taken: {0}")]
    Conflict(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                UserError::Conflict(db_err.message().to_string())
            }
            _ => UserError::Storage(err.to_string()),
        }
    }
}

impl From<crate::utils::UtilError> for UserError {
    fn from(err: crate::utils::UtilError) -> Self {
        UserError::Hashing(err.to_string())
    }
}
